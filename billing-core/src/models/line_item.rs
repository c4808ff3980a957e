//! Line item model.

use crate::numeric::{parse_optional, to_safe_number};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One row of an invoice.
///
/// A line item has no identity of its own; it is addressed by its position
/// in [`crate::Invoice::items`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "RawLineItem")]
pub struct InvoiceLineItem {
    pub product_name: String,
    /// Kilograms per package.
    pub packing_qty: Decimal,
    /// Number of packages.
    pub no_of_units: Decimal,
    pub rate_per_kg: Decimal,
    pub hsn_code: String,
    /// Quantity stored by older records; only statements read it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_qty: Option<Decimal>,
}

impl InvoiceLineItem {
    pub fn new(
        product_name: impl Into<String>,
        packing_qty: Decimal,
        no_of_units: Decimal,
        rate_per_kg: Decimal,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            packing_qty,
            no_of_units,
            rate_per_kg,
            hsn_code: String::new(),
            total_qty: None,
        }
    }

    /// Kilograms shipped on this row. A product outside the decimal range
    /// counts as zero, like any other unusable figure.
    pub fn quantity_kg(&self) -> Decimal {
        self.packing_qty
            .checked_mul(self.no_of_units)
            .unwrap_or_else(|| {
                warn!(
                    product = %self.product_name,
                    packing_qty = %self.packing_qty,
                    no_of_units = %self.no_of_units,
                    "line quantity out of range, counted as zero"
                );
                Decimal::ZERO
            })
    }

    /// Unrounded line amount.
    pub fn amount(&self) -> Decimal {
        let quantity = self.quantity_kg();
        quantity.checked_mul(self.rate_per_kg).unwrap_or_else(|| {
            warn!(
                product = %self.product_name,
                %quantity,
                rate_per_kg = %self.rate_per_kg,
                "line amount out of range, counted as zero"
            );
            Decimal::ZERO
        })
    }
}

/// Wire shape accepted from the backend and from older page revisions.
///
/// `units` and `description` are earlier names for `no_of_units` and
/// `product_name`; when both spellings are present the current one wins.
#[derive(Deserialize)]
struct RawLineItem {
    #[serde(default)]
    product_name: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    packing_qty: Option<Value>,
    #[serde(default)]
    no_of_units: Option<Value>,
    #[serde(default)]
    units: Option<Value>,
    #[serde(default)]
    rate_per_kg: Option<Value>,
    #[serde(default)]
    hsn_code: Option<Value>,
    #[serde(default)]
    total_qty: Option<Value>,
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Decimal {
    value.map(to_safe_number).unwrap_or_default()
}

impl From<RawLineItem> for InvoiceLineItem {
    fn from(raw: RawLineItem) -> Self {
        let units = raw.no_of_units.or(raw.units);

        let total_qty = match raw.total_qty.as_ref() {
            Some(Value::Number(n)) => parse_optional(&n.to_string()),
            Some(Value::String(s)) => parse_optional(s),
            _ => None,
        };

        Self {
            product_name: text(raw.product_name.as_ref())
                .or_else(|| text(raw.description.as_ref()))
                .unwrap_or_default(),
            packing_qty: number(raw.packing_qty.as_ref()),
            no_of_units: number(units.as_ref()),
            rate_per_kg: number(raw.rate_per_kg.as_ref()),
            hsn_code: text(raw.hsn_code.as_ref()).unwrap_or_default(),
            total_qty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_strings_and_legacy_names() {
        let item: InvoiceLineItem = serde_json::from_value(json!({
            "description": "Flexo Ink Black",
            "packing_qty": "20",
            "units": 3,
            "rate_per_kg": "abc",
            "hsn_code": 3215
        }))
        .unwrap();

        assert_eq!(item.product_name, "Flexo Ink Black");
        assert_eq!(item.packing_qty, Decimal::from(20));
        assert_eq!(item.no_of_units, Decimal::from(3));
        assert_eq!(item.rate_per_kg, Decimal::ZERO);
        assert_eq!(item.hsn_code, "3215");
        assert_eq!(item.quantity_kg(), Decimal::from(60));
    }

    #[test]
    fn out_of_range_line_counts_as_zero() {
        let huge = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        let item = InvoiceLineItem::new("Ink", huge, huge, Decimal::ONE);
        assert_eq!(item.quantity_kg(), Decimal::ZERO);
        assert_eq!(item.amount(), Decimal::ZERO);

        let item = InvoiceLineItem::new("Ink", huge, Decimal::ONE, huge);
        assert_eq!(item.quantity_kg(), huge);
        assert_eq!(item.amount(), Decimal::ZERO);
    }

    #[test]
    fn current_field_name_wins_over_legacy() {
        let item: InvoiceLineItem = serde_json::from_value(json!({
            "product_name": "Roto Ink",
            "no_of_units": 4,
            "units": 9
        }))
        .unwrap();
        assert_eq!(item.no_of_units, Decimal::from(4));
    }

    #[test]
    fn serializes_figures_as_numbers() {
        let item = InvoiceLineItem::new(
            "Ink",
            Decimal::from(5),
            Decimal::from(2),
            Decimal::new(1505, 1),
        );
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["packing_qty"], json!(5.0));
        assert_eq!(value["rate_per_kg"], json!(150.5));
        assert!(value.get("total_qty").is_none());
    }
}
