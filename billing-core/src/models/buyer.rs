use crate::numeric::string_or_empty;
use serde::{Deserialize, Serialize};

/// Buyer record as listed by the backend.
///
/// Invoices copy the name, address and GSTIN at selection time; later edits
/// to a buyer do not touch existing invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Buyer {
    #[serde(rename = "_id", default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub gstin: String,
}

/// Request body for creating or updating a buyer.
#[derive(Debug, Clone, Serialize)]
pub struct NewBuyer {
    pub name: String,
    pub address: String,
    pub gstin: String,
}
