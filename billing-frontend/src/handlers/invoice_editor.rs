//! Create and edit pages for invoices.
//!
//! The form is posted back in full on every button press. The handler
//! rebuilds an [`InvoiceEditor`] from the snapshot, applies the pressed
//! action and renders the result, so totals shown are always the editor's.

use crate::handlers::error::PageError;
use crate::models::{EditorAction, InvoiceForm};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use billing_core::format::{inr, quantity};
use billing_core::words::amount_in_words;
use billing_core::{Buyer, InvoiceEditor, Product, TaxMode};
use rust_decimal::Decimal;

/// Where a save goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(String),
}

impl EditorTarget {
    fn form_url(&self) -> String {
        match self {
            EditorTarget::New => "/invoices/new".to_string(),
            EditorTarget::Existing(id) => format!("/invoices/{id}/edit"),
        }
    }
}

pub struct EditorRow {
    pub index: usize,
    pub product_id: String,
    pub product_name: String,
    pub hsn_code: String,
    pub packing_qty: String,
    pub no_of_units: String,
    pub rate_per_kg: String,
    pub total_qty: String,
    pub amount: String,
}

#[derive(Template)]
#[template(path = "pages/invoice_form.html")]
pub struct InvoiceFormTemplate {
    pub current_page: &'static str,
    pub title: String,
    pub form_url: String,
    pub invoice_id: Option<String>,
    pub invoice_no: String,
    pub date: String,
    pub buyer_id: String,
    pub buyer_name: String,
    pub address: String,
    pub gstin: String,
    pub status: &'static str,
    pub rows: Vec<EditorRow>,
    pub can_remove: bool,
    pub cgst_override: String,
    pub sgst_override: String,
    pub cgst_label: String,
    pub sgst_label: String,
    pub subtotal: String,
    pub cgst: String,
    pub sgst: String,
    pub total: String,
    pub amount_in_words: String,
    pub buyers: Vec<Buyer>,
    pub products: Vec<Product>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

/// Blank input for zero so untouched cells stay empty.
fn input_value(value: Decimal) -> String {
    if value.is_zero() {
        String::new()
    } else {
        quantity(value)
    }
}

struct Lookups {
    buyers: Vec<Buyer>,
    products: Vec<Product>,
    warnings: Vec<String>,
}

async fn load_lookups(state: &AppState) -> Lookups {
    let (buyers, products) = tokio::join!(state.api.list_buyers(), state.api.list_products());
    let mut warnings = Vec::new();

    let buyers = buyers.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load buyers for the invoice form");
        warnings.push(format!("Buyers unavailable: {}", e.user_message()));
        Vec::new()
    });
    let products = products.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load products for the invoice form");
        warnings.push(format!("Products unavailable: {}", e.user_message()));
        Vec::new()
    });

    Lookups {
        buyers,
        products,
        warnings,
    }
}

fn render(
    editor: &InvoiceEditor,
    target: &EditorTarget,
    buyer_id: &str,
    product_ids: &[String],
    lookups: Lookups,
    error: Option<String>,
    mut warnings: Vec<String>,
) -> InvoiceFormTemplate {
    let invoice = editor.invoice();
    let totals = editor.totals();
    let policy = editor.policy();

    let (cgst_override, sgst_override) = match editor.tax_mode() {
        TaxMode::Standard => (String::new(), String::new()),
        TaxMode::Manual(taxes) => (
            taxes.cgst.map(quantity).unwrap_or_default(),
            taxes.sgst.map(quantity).unwrap_or_default(),
        ),
    };

    let rows = invoice
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| EditorRow {
            index,
            product_id: product_ids.get(index).cloned().unwrap_or_default(),
            product_name: item.product_name.clone(),
            hsn_code: item.hsn_code.clone(),
            packing_qty: input_value(item.packing_qty),
            no_of_units: input_value(item.no_of_units),
            rate_per_kg: input_value(item.rate_per_kg),
            total_qty: quantity(item.quantity_kg()),
            amount: inr(item.amount()),
        })
        .collect::<Vec<_>>();

    warnings.extend(lookups.warnings);

    InvoiceFormTemplate {
        current_page: match target {
            EditorTarget::New => "new_invoice",
            EditorTarget::Existing(_) => "invoices",
        },
        title: match target {
            EditorTarget::New => "Create Invoice".to_string(),
            EditorTarget::Existing(_) => format!("Edit Invoice {}", invoice.invoice_no),
        },
        form_url: target.form_url(),
        invoice_id: match target {
            EditorTarget::New => None,
            EditorTarget::Existing(id) => Some(id.clone()),
        },
        invoice_no: invoice.invoice_no.clone(),
        date: invoice.date.clone(),
        buyer_id: buyer_id.to_string(),
        buyer_name: invoice.buyer_name.clone(),
        address: invoice.address.clone(),
        gstin: invoice.gstin.clone(),
        status: invoice.status.as_str(),
        can_remove: rows.len() > 1,
        rows,
        cgst_override,
        sgst_override,
        cgst_label: format!("CGST ({:.1}%)", policy.cgst_percent()),
        sgst_label: format!("SGST ({:.1}%)", policy.sgst_percent()),
        subtotal: inr(totals.subtotal),
        cgst: inr(totals.cgst),
        sgst: inr(totals.sgst),
        total: inr(totals.total_amount),
        amount_in_words: amount_in_words(totals.total_amount),
        buyers: lookups.buyers,
        products: lookups.products,
        error,
        warnings,
    }
}

pub async fn new_invoice_page(State(state): State<AppState>) -> impl IntoResponse {
    let editor = InvoiceEditor::new_draft("", state.today().format("%Y-%m-%d").to_string());
    let lookups = load_lookups(&state).await;
    render(&editor, &EditorTarget::New, "", &[], lookups, None, Vec::new())
}

pub async fn edit_invoice_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<InvoiceFormTemplate, PageError> {
    let (invoice, lookups) = tokio::join!(state.api.get_invoice(&id), load_lookups(&state));
    let editor = InvoiceEditor::from_invoice(invoice?);
    let buyer_id = lookups
        .buyers
        .iter()
        .find(|b| b.name == editor.invoice().buyer_name)
        .map(|b| b.id.clone())
        .unwrap_or_default();
    Ok(render(
        &editor,
        &EditorTarget::Existing(id),
        &buyer_id,
        &[],
        lookups,
        None,
        Vec::new(),
    ))
}

pub async fn submit_new_invoice(
    State(state): State<AppState>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    submit(state, EditorTarget::New, form).await
}

pub async fn submit_invoice_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    submit(state, EditorTarget::Existing(id), form).await
}

async fn submit(state: AppState, target: EditorTarget, form: InvoiceForm) -> Response {
    let mut editor = form.to_editor();
    let lookups = load_lookups(&state).await;
    let mut product_ids = form.product_id.clone();
    let mut warnings = Vec::new();

    let action = match form.action() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(action = %form.action, error = %e, "unknown invoice form action");
            EditorAction::Recalculate
        }
    };
    tracing::debug!(?action, ?target, "invoice form action");

    match action {
        EditorAction::AddItem => editor.add_item(),
        EditorAction::RemoveItem(idx) => {
            if editor.remove_item(idx) && idx < product_ids.len() {
                product_ids.remove(idx);
            }
        }
        EditorAction::PickProduct(idx) => {
            let picked = form
                .product_for_row(idx)
                .and_then(|id| lookups.products.iter().find(|p| p.id == id));
            match picked {
                Some(product) => {
                    editor.select_product(idx, product);
                }
                None => warnings.push("Choose a product for that row first".to_string()),
            }
        }
        EditorAction::PickBuyer => {
            let id = form.buyer_id.trim();
            match lookups.buyers.iter().find(|b| b.id == id) {
                Some(buyer) => editor.select_buyer(buyer),
                None => warnings.push("Choose a buyer first".to_string()),
            }
        }
        EditorAction::ClearBuyer => {
            editor.clear_buyer();
            return render(&editor, &target, "", &product_ids, lookups, None, warnings)
                .into_response();
        }
        EditorAction::Recalculate => {}
        EditorAction::Save => return save(&state, editor, target, &form, lookups).await,
    }

    render(
        &editor,
        &target,
        &form.buyer_id,
        &product_ids,
        lookups,
        None,
        warnings,
    )
    .into_response()
}

async fn save(
    state: &AppState,
    editor: InvoiceEditor,
    target: EditorTarget,
    form: &InvoiceForm,
    lookups: Lookups,
) -> Response {
    let warnings = match editor.validate_for_save() {
        Ok(warnings) => warnings,
        Err(e) => {
            return render(
                &editor,
                &target,
                &form.buyer_id,
                &form.product_id,
                lookups,
                Some(e.to_string()),
                Vec::new(),
            )
            .into_response();
        }
    };
    for warning in &warnings {
        tracing::info!(invoice_no = %editor.invoice().invoice_no, %warning, "saving invoice with warning");
    }

    let payload = editor.payload();
    let result = match &target {
        EditorTarget::New => state.api.create_invoice(&payload).await.map(|created| {
            tracing::info!(invoice_id = %created.id, invoice_no = %editor.invoice().invoice_no, "invoice created");
            "/invoices?notice=invoice_created"
        }),
        EditorTarget::Existing(id) => state.api.update_invoice(id, &payload).await.map(|_| {
            tracing::info!(invoice_id = %id, invoice_no = %editor.invoice().invoice_no, "invoice updated");
            "/invoices?notice=invoice_updated"
        }),
    };

    match result {
        Ok(location) => Redirect::to(location).into_response(),
        Err(e) => {
            tracing::error!(?target, error = %e, "failed to save invoice");
            render(
                &editor,
                &target,
                &form.buyer_id,
                &form.product_id,
                lookups,
                Some(e.user_message()),
                warnings,
            )
            .into_response()
        }
    }
}
