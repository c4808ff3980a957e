use crate::numeric::{lenient_decimal, string_or_empty};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock item.
///
/// Only used to pre-fill a new line item; the invoice keeps no link to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Product {
    #[serde(rename = "_id", default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub stock_quantity: Decimal,
    #[serde(default, alias = "rate_per_kg", deserialize_with = "lenient_decimal")]
    pub default_rate_per_kg: Decimal,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub hsn_code: String,
}

/// Request body for creating a product.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub stock_quantity: Decimal,
    pub default_rate_per_kg: Decimal,
    pub hsn_code: String,
}

/// Partial update; only the present fields are sent.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsn_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rate_per_kg: Option<Decimal>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.hsn_code.is_none()
            && self.stock_quantity.is_none()
            && self.default_rate_per_kg.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_like_the_backend() {
        let product: Product =
            serde_json::from_value(json!({"_id": "p1", "name": "Gravure Ink"})).unwrap();
        assert_eq!(product.stock_quantity, Decimal::ZERO);
        assert_eq!(product.default_rate_per_kg, Decimal::ZERO);
        assert_eq!(product.hsn_code, "");
    }

    #[test]
    fn update_skips_absent_fields() {
        let update = ProductUpdate {
            stock_quantity: Some(Decimal::from(12)),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"stock_quantity": 12.0})
        );
    }
}
