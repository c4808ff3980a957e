//! billing-core: invoice arithmetic and document formatting for the billing front-end.
//!
//! Everything in this crate is synchronous and free of I/O. Pages and the PDF
//! renderer in `billing-frontend` call into it with a snapshot of the invoice
//! they are showing.

pub mod editor;
pub mod error;
pub mod format;
pub mod models;
pub mod numeric;
pub mod search;
pub mod statement;
pub mod totals;
pub mod words;

pub use editor::{InvoiceEditor, ItemField, TaxMode};
pub use error::Error;
pub use models::{
    Buyer, BuyerStatement, Invoice, InvoiceLineItem, InvoiceStatus, Product, StatementFilter,
    StatementInvoice,
};
pub use numeric::{parse_lenient, to_safe_number};
pub use statement::StatementTotals;
pub use totals::{compute_totals, InvoiceTotals, TaxOverride, TaxPolicy};
pub use words::amount_in_words;

pub use rust_decimal::Decimal;
