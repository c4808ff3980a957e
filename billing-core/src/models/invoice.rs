//! Invoice model.

use super::InvoiceLineItem;
use crate::numeric::{lenient_decimal, string_or_empty};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    #[serde(other)]
    Unpaid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Unpaid => "unpaid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Unpaid,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            InvoiceStatus::Paid => InvoiceStatus::Unpaid,
            InvoiceStatus::Unpaid => InvoiceStatus::Paid,
        }
    }
}

/// Invoice document.
///
/// `subtotal`, `cgst`, `sgst` and `total_amount` are derived from `items`.
/// Nothing here keeps them in sync; go through [`crate::InvoiceEditor`] to
/// mutate an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Invoice {
    /// Backend document id. Never sent back in a request body.
    #[serde(rename = "_id", default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub invoice_no: String,
    /// Calendar date as stored by the backend (normally `YYYY-MM-DD`).
    #[serde(default, deserialize_with = "string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub buyer_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub gstin: String,
    #[serde(default)]
    pub items: Vec<InvoiceLineItem>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub subtotal: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cgst: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sgst: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Parse [`Invoice::date`] as a calendar date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// Parse the date shapes the backend is known to return: plain ISO dates,
/// RFC 3339 timestamps and the RFC 2822 form Flask emits for datetimes.
pub(crate) fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backend_document_deserializes() {
        let invoice: Invoice = serde_json::from_value(json!({
            "_id": "665f1c2e9b1d8a0012345678",
            "invoice_no": 42,
            "date": "2025-01-05",
            "buyer_name": "Sai Packaging",
            "address": "Bhiwandi",
            "items": [{"product_name": "Ink", "packing_qty": 10, "no_of_units": 2, "rate_per_kg": 100}],
            "subtotal": "2000",
            "cgst": 180,
            "sgst": 180,
            "total_amount": 2360
        }))
        .unwrap();

        assert_eq!(invoice.id.as_deref(), Some("665f1c2e9b1d8a0012345678"));
        assert_eq!(invoice.invoice_no, "42");
        assert_eq!(invoice.gstin, "");
        assert_eq!(invoice.subtotal, Decimal::from(2000));
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(
            invoice.calendar_date(),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
    }

    #[test]
    fn id_is_not_serialized() {
        let invoice = Invoice {
            id: Some("abc".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&invoice).unwrap();
        assert!(value.get("_id").is_none());
        assert_eq!(value["status"], json!("unpaid"));
    }

    #[test]
    fn unknown_status_reads_as_unpaid() {
        let invoice: Invoice = serde_json::from_value(json!({"status": "overdue"})).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(InvoiceStatus::from_string(" PAID "), InvoiceStatus::Paid);
    }

    #[test]
    fn flask_style_dates_parse() {
        assert_eq!(
            parse_calendar_date("Sun, 05 Jan 2025 00:00:00 GMT"),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
        assert_eq!(
            parse_calendar_date("2025-01-05T10:30:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
        assert_eq!(parse_calendar_date("soon"), None);
    }
}
