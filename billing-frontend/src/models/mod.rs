pub mod document;
pub mod forms;

pub use document::{InvoiceDocument, StatementDocument};
pub use forms::{
    BuyerForm, EditorAction, InvoiceForm, ProductEditForm, ProductForm, SearchQuery,
    StatementQuery, StatusForm, StockAdjustForm,
};
