use crate::handlers::notice_text;
use crate::models::{SearchQuery, StatusForm};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use billing_core::format::{inr, invoice_date};
use billing_core::search::filter_invoices;
use billing_core::{Invoice, InvoiceStatus};

/// Invoice as listed on the invoices page. `id` is empty for records the
/// backend returned without one; those rows get no actions.
pub struct InvoiceListRow {
    pub id: String,
    pub invoice_no: String,
    pub date: String,
    pub buyer_name: String,
    pub total: String,
    pub paid: bool,
    pub next_status: &'static str,
}

impl From<&Invoice> for InvoiceListRow {
    fn from(inv: &Invoice) -> Self {
        Self {
            id: inv.id.clone().unwrap_or_default(),
            invoice_no: inv.invoice_no.clone(),
            date: invoice_date(&inv.date),
            buyer_name: inv.buyer_name.clone(),
            total: inr(inv.total_amount),
            paid: inv.is_paid(),
            next_status: inv.status.toggled().as_str(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/invoices.html")]
pub struct InvoicesTemplate {
    pub current_page: &'static str,
    pub invoices: Vec<InvoiceListRow>,
    pub total: usize,
    pub q: String,
    pub notice: Option<&'static str>,
    pub error: Option<String>,
}

async fn render_list(
    state: &AppState,
    q: &str,
    notice: Option<&'static str>,
    error: Option<String>,
) -> InvoicesTemplate {
    let (all, error) = match state.api.list_invoices().await {
        Ok(invoices) => (invoices, error),
        Err(e) => {
            tracing::error!(error = %e, "failed to load invoices");
            (Vec::new(), error.or_else(|| Some(e.user_message())))
        }
    };

    InvoicesTemplate {
        current_page: "invoices",
        total: all.len(),
        invoices: filter_invoices(&all, q)
            .into_iter()
            .map(InvoiceListRow::from)
            .collect(),
        q: q.trim().to_string(),
        notice,
        error,
    }
}

pub async fn list_invoices_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    render_list(&state, &query.q, notice_text(&query.notice), None).await
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let status: InvoiceStatus = form.status();
    match state.api.set_invoice_status(&id, status).await {
        Ok(_) => {
            tracing::info!(invoice_id = %id, status = status.as_str(), "invoice status changed");
            Redirect::to("/invoices?notice=status_updated").into_response()
        }
        Err(e) => {
            tracing::error!(invoice_id = %id, error = %e, "failed to change invoice status");
            render_list(&state, "", None, Some(e.user_message()))
                .await
                .into_response()
        }
    }
}

pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.api.delete_invoice(&id).await {
        Ok(_) => {
            tracing::info!(invoice_id = %id, "invoice deleted");
            Redirect::to("/invoices?notice=invoice_deleted").into_response()
        }
        Err(e) => {
            tracing::error!(invoice_id = %id, error = %e, "failed to delete invoice");
            render_list(&state, "", None, Some(e.user_message()))
                .await
                .into_response()
        }
    }
}
