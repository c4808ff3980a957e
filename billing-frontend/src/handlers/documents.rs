use crate::handlers::error::PageError;
use crate::models::{InvoiceDocument, StatementDocument, StatementQuery};
use crate::services::metrics::record_document;
use crate::services::pdf::{render_invoice_pdf, render_statement_pdf, PdfError};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use billing_core::statement::parse_filter;
use billing_core::BuyerStatement;

#[derive(Template)]
#[template(path = "pages/invoice_print.html")]
pub struct InvoicePrintTemplate {
    pub doc: InvoiceDocument,
}

#[derive(Template)]
#[template(path = "pages/statement_print.html")]
pub struct StatementPrintTemplate {
    pub doc: StatementDocument,
}

async fn load_invoice_document(state: &AppState, id: &str) -> Result<InvoiceDocument, PageError> {
    let invoice = state.api.get_invoice(id).await?;
    Ok(InvoiceDocument::new(invoice, &state.seller, state.today()))
}

async fn load_statement(
    state: &AppState,
    buyer_id: &str,
    query: &StatementQuery,
) -> Result<BuyerStatement, PageError> {
    let filter = parse_filter(Some(&query.start_date), Some(&query.end_date))
        .map_err(|e| PageError::bad_request(e.to_string()))?;
    let mut statement = state.api.get_statement(buyer_id, &filter).await?;
    statement.filter = filter;
    Ok(statement)
}

/// PDF rendering is CPU-bound; keep it off the async workers.
async fn render_pdf<D, F>(doc: D, render: F) -> Result<Vec<u8>, PageError>
where
    D: Send + 'static,
    F: FnOnce(&D) -> Result<Vec<u8>, PdfError> + Send + 'static,
{
    let bytes = tokio::task::spawn_blocking(move || render(&doc))
        .await
        .map_err(PageError::internal)??;
    Ok(bytes)
}

fn pdf_response(file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn print_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<InvoicePrintTemplate, PageError> {
    let doc = load_invoice_document(&state, &id).await?;
    record_document("invoice_html");
    tracing::info!(invoice_id = %id, invoice_no = %doc.invoice_no, "invoice rendered for print");
    Ok(InvoicePrintTemplate { doc })
}

pub async fn invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let doc = load_invoice_document(&state, &id).await?;
    let file_name = doc.file_name();
    let bytes = render_pdf(doc, render_invoice_pdf).await?;
    record_document("invoice_pdf");
    tracing::info!(invoice_id = %id, bytes = bytes.len(), "invoice pdf rendered");
    Ok(pdf_response(&file_name, bytes))
}

pub async fn print_statement(
    State(state): State<AppState>,
    Path(buyer_id): Path<String>,
    Query(query): Query<StatementQuery>,
) -> Result<StatementPrintTemplate, PageError> {
    let statement = load_statement(&state, &buyer_id, &query).await?;
    let doc = StatementDocument::new(&statement, &state.seller, state.today());
    record_document("statement_html");
    tracing::info!(buyer_id = %buyer_id, invoices = doc.invoice_count, "statement rendered for print");
    Ok(StatementPrintTemplate { doc })
}

pub async fn statement_pdf(
    State(state): State<AppState>,
    Path(buyer_id): Path<String>,
    Query(query): Query<StatementQuery>,
) -> Result<Response, PageError> {
    let statement = load_statement(&state, &buyer_id, &query).await?;
    let doc = StatementDocument::new(&statement, &state.seller, state.today());
    let file_name = doc.file_name();
    let bytes = render_pdf(doc, render_statement_pdf).await?;
    record_document("statement_pdf");
    tracing::info!(buyer_id = %buyer_id, bytes = bytes.len(), "statement pdf rendered");
    Ok(pdf_response(&file_name, bytes))
}
