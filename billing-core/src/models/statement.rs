//! Buyer statement model.

use super::InvoiceLineItem;
use crate::numeric::{lenient_decimal, string_or_empty};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Optional inclusive date window for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatementFilter {
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
}

impl StatementFilter {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    /// Query parameters understood by `GET /statements/:buyerId`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

/// Invoice row inside a statement (the backend projects a subset of fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatementInvoice {
    #[serde(rename = "_id", default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub invoice_no: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub date: String,
    #[serde(default)]
    pub items: Vec<InvoiceLineItem>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_amount: Decimal,
}

/// Response of `GET /statements/:buyerId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BuyerStatement {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub buyer: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub buyer_gstin: String,
    #[serde(default)]
    pub invoice_count: u64,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_qty: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub invoices: Vec<StatementInvoice>,
    #[serde(default)]
    pub filter: StatementFilter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_statement_response_deserializes() {
        let statement: BuyerStatement = serde_json::from_value(json!({
            "buyer": "Sai Packaging",
            "buyer_gstin": "",
            "invoice_count": 0,
            "total_qty": 0,
            "total_amount": 0,
            "invoices": [],
            "filter": {"start_date": null, "end_date": "2025-03-31"}
        }))
        .unwrap();

        assert_eq!(statement.invoice_count, 0);
        assert_eq!(statement.filter.start_date, None);
        assert_eq!(
            statement.filter.end_date,
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
    }

    #[test]
    fn filter_builds_query_pairs() {
        let filter = StatementFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            end_date: None,
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("start_date", "2025-04-01".to_string())]
        );
        assert!(StatementFilter::default().is_empty());
    }
}
