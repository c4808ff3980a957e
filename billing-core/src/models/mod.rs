//! Domain models shared by the pages, the backend client and the renderers.

mod buyer;
mod invoice;
mod line_item;
mod product;
mod statement;

pub use buyer::{Buyer, NewBuyer};
pub use invoice::{Invoice, InvoiceStatus};
pub(crate) use invoice::parse_calendar_date;
pub use line_item::InvoiceLineItem;
pub use product::{NewProduct, Product, ProductUpdate};
pub use statement::{BuyerStatement, StatementFilter, StatementInvoice};
