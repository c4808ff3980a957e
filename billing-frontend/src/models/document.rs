//! Printable documents.
//!
//! The HTML print pages and the PDF renderer read the same view model, so
//! both show identical figures and wording.

use crate::config::SellerSettings;
use billing_core::format::{
    fixed2, gstin_display, inr, invoice_date, quantity, statement_date, GSTIN_NOT_PROVIDED,
};
use billing_core::statement::{invoice_total_qty, summarize};
use billing_core::words::amount_in_words;
use billing_core::{BuyerStatement, Invoice, InvoiceEditor, StatementFilter};
use chrono::NaiveDate;

/// Rows printed in the item table; shorter invoices are padded with blanks.
pub const INVOICE_TABLE_ROWS: usize = 8;

#[derive(Debug, Clone)]
pub struct InvoiceRow {
    pub sr_no: usize,
    pub description: String,
    pub hsn_code: String,
    pub packing: String,
    /// `"20 x 3 = 60"`
    pub kg: String,
    pub rate: String,
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub seller: SellerSettings,
    pub invoice_no: String,
    pub invoice_date: String,
    pub buyer_name: String,
    pub address: String,
    pub gstin: String,
    pub gstin_missing: bool,
    pub rows: Vec<InvoiceRow>,
    pub filler_rows: usize,
    pub subtotal: String,
    pub cgst_label: String,
    pub cgst: String,
    pub sgst_label: String,
    pub sgst: String,
    pub total: String,
    pub amount_in_words: String,
    pub gst_in_words: String,
    pub paid: bool,
}

impl InvoiceDocument {
    /// Build the document for a stored invoice.
    ///
    /// Totals are rederived from the items; hand-entered tax amounts are kept.
    pub fn new(invoice: Invoice, seller: &SellerSettings, today: NaiveDate) -> Self {
        let editor = InvoiceEditor::from_invoice(invoice);
        let totals = editor.totals();
        let policy = *editor.policy();
        let invoice = editor.into_invoice();

        let rows: Vec<InvoiceRow> = invoice
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| InvoiceRow {
                sr_no: idx + 1,
                description: non_blank(&item.product_name, "Not specified"),
                hsn_code: item.hsn_code.clone(),
                packing: quantity(item.packing_qty),
                kg: format!(
                    "{} x {} = {}",
                    quantity(item.packing_qty),
                    quantity(item.no_of_units),
                    quantity(item.quantity_kg())
                ),
                rate: fixed2(item.rate_per_kg),
                amount: inr(item.amount()),
            })
            .collect();

        let date = if invoice.date.trim().is_empty() {
            today.format("%d %b %Y").to_string()
        } else {
            invoice_date(&invoice.date)
        };

        let gstin = gstin_display(&invoice.gstin);

        Self {
            seller: seller.clone(),
            invoice_no: non_blank(&invoice.invoice_no, "Not specified"),
            invoice_date: date,
            buyer_name: non_blank(&invoice.buyer_name, "No buyer selected"),
            address: invoice.address.clone(),
            gstin_missing: gstin == GSTIN_NOT_PROVIDED,
            gstin,
            filler_rows: INVOICE_TABLE_ROWS.saturating_sub(rows.len()),
            rows,
            subtotal: fixed2(totals.subtotal),
            cgst_label: format!("CGST: {:.1}%", policy.cgst_percent()),
            cgst: inr(totals.cgst),
            sgst_label: format!("SGST: {:.1}%", policy.sgst_percent()),
            sgst: inr(totals.sgst),
            total: inr(totals.total_amount),
            amount_in_words: amount_in_words(totals.total_amount),
            gst_in_words: amount_in_words(totals.gst_total()),
            paid: invoice.is_paid(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("invoice-{}.pdf", sanitize_file_part(&self.invoice_no))
    }
}

#[derive(Debug, Clone)]
pub struct StatementRow {
    pub invoice_no: String,
    pub date: String,
    pub item_count: usize,
    pub total_qty: String,
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct StatementDocument {
    pub seller: SellerSettings,
    pub buyer: String,
    pub buyer_gstin: Option<String>,
    pub generated_on: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub rows: Vec<StatementRow>,
    pub invoice_count: u64,
    pub total_qty: String,
    pub total_amount: String,
}

impl StatementDocument {
    /// Build the document; footer totals are recomputed from the rows shown.
    pub fn new(statement: &BuyerStatement, seller: &SellerSettings, today: NaiveDate) -> Self {
        let totals = summarize(&statement.invoices);
        if totals.invoice_count != statement.invoice_count
            || totals.total_amount != statement.total_amount
        {
            tracing::debug!(
                buyer = %statement.buyer,
                backend_count = statement.invoice_count,
                backend_amount = %statement.total_amount,
                local_amount = %totals.total_amount,
                "statement totals differ from backend summary; using row sums"
            );
        }

        let rows = statement
            .invoices
            .iter()
            .map(|inv| StatementRow {
                invoice_no: inv.invoice_no.clone(),
                date: statement_date(&inv.date),
                item_count: inv.items.len(),
                total_qty: fixed2(invoice_total_qty(&inv.items)),
                amount: fixed2(inv.total_amount),
            })
            .collect();

        let gstin = statement.buyer_gstin.trim();
        Self {
            seller: seller.clone(),
            buyer: statement.buyer.clone(),
            buyer_gstin: (!gstin.is_empty()).then(|| gstin.to_uppercase()),
            generated_on: today.format("%-d/%-m/%Y").to_string(),
            from: filter_bound(&statement.filter, |f| f.start_date),
            to: filter_bound(&statement.filter, |f| f.end_date),
            rows,
            invoice_count: totals.invoice_count,
            total_qty: fixed2(totals.total_qty),
            total_amount: fixed2(totals.total_amount),
        }
    }

    pub fn file_name(&self) -> String {
        format!("statement-{}.pdf", sanitize_file_part(&self.buyer))
    }
}

fn filter_bound(
    filter: &StatementFilter,
    pick: impl Fn(&StatementFilter) -> Option<NaiveDate>,
) -> Option<String> {
    pick(filter).map(|d| d.format("%-d/%-m/%Y").to_string())
}

fn non_blank(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Keep file names to ASCII alphanumerics, dashes and underscores.
fn sanitize_file_part(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}
