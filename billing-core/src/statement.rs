//! Buyer statement summary and date-filter parsing.

use crate::error::Error;
use crate::models::{InvoiceLineItem, StatementFilter, StatementInvoice};
use crate::numeric::checked_total;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Footer figures of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatementTotals {
    pub invoice_count: u64,
    pub total_qty: Decimal,
    pub total_amount: Decimal,
}

/// Kilograms on one invoice.
///
/// Rows that carry a stored `total_qty` use it; otherwise packing × units.
pub fn invoice_total_qty(items: &[InvoiceLineItem]) -> Decimal {
    checked_total(
        items
            .iter()
            .map(|item| item.total_qty.unwrap_or_else(|| item.quantity_kg())),
        "invoice quantity",
    )
}

/// Recompute the footer from the rows being shown.
pub fn summarize(invoices: &[StatementInvoice]) -> StatementTotals {
    StatementTotals {
        invoice_count: invoices.len() as u64,
        total_qty: checked_total(
            invoices.iter().map(|invoice| invoice_total_qty(&invoice.items)),
            "statement quantity",
        ),
        total_amount: checked_total(
            invoices.iter().map(|invoice| invoice.total_amount),
            "statement amount",
        ),
    }
}

/// Parse optional `start_date`/`end_date` query values.
///
/// Blank values mean "unbounded". Dates must be `YYYY-MM-DD` and the range
/// must not be inverted.
pub fn parse_filter(start: Option<&str>, end: Option<&str>) -> Result<StatementFilter, Error> {
    let start_date = parse_bound(start, "start_date")?;
    let end_date = parse_bound(end, "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(Error::InvertedDateRange);
        }
    }

    Ok(StatementFilter {
        start_date,
        end_date,
    })
}

fn parse_bound(raw: Option<&str>, field: &'static str) -> Result<Option<NaiveDate>, Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| Error::InvalidDate { field }),
    }
}
