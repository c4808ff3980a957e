pub mod app;
pub mod buyers;
pub mod documents;
pub mod error;
pub mod invoice_editor;
pub mod invoices;
pub mod metrics;
pub mod statement;
pub mod stock;

use validator::ValidationErrors;

/// Banner text for the `?notice=` code set by a redirect after a successful POST.
pub fn notice_text(code: &str) -> Option<&'static str> {
    Some(match code {
        "buyer_created" => "Buyer added successfully",
        "buyer_updated" => "Buyer updated successfully",
        "buyer_deleted" => "Buyer deleted successfully",
        "product_created" => "Product added successfully",
        "product_updated" => "Product updated successfully",
        "product_deleted" => "Product deleted successfully",
        "stock_updated" => "Stock quantity updated successfully",
        "invoice_created" => "Invoice saved",
        "invoice_updated" => "Invoice updated successfully",
        "invoice_deleted" => "Invoice deleted successfully",
        "status_updated" => "Invoice status updated",
        _ => return None,
    })
}

/// One line per failing field, using the messages declared on the form.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
