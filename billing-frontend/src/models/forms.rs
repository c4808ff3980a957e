//! Form bodies posted by the pages.

use billing_core::models::{NewBuyer, NewProduct, ProductUpdate};
use billing_core::numeric::{parse_lenient, parse_optional};
use billing_core::{Invoice, InvoiceEditor, InvoiceStatus, ItemField, TaxMode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct BuyerForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Address is required"))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 15, message = "GSTIN must be at most 15 characters"))]
    pub gstin: String,
}

impl BuyerForm {
    pub fn into_new_buyer(self) -> NewBuyer {
        NewBuyer {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            gstin: self.gstin.trim().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct ProductForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Product name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "HSN code is required"))]
    pub hsn_code: String,
    #[serde(default)]
    #[validate(custom(function = "number_or_blank", message = "Stock must be a number"))]
    pub stock_quantity: String,
    #[serde(default)]
    #[validate(custom(function = "number_or_blank", message = "Rate must be a number"))]
    pub default_rate_per_kg: String,
}

impl ProductForm {
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name.trim().to_string(),
            stock_quantity: parse_lenient(&self.stock_quantity),
            default_rate_per_kg: parse_lenient(&self.default_rate_per_kg),
            hsn_code: self.hsn_code.trim().to_string(),
        }
    }
}

/// Product edit form; blank fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct ProductEditForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hsn_code: String,
    #[serde(default)]
    #[validate(custom(function = "number_or_blank", message = "Rate must be a number"))]
    pub default_rate_per_kg: String,
}

impl ProductEditForm {
    pub fn into_update(self) -> ProductUpdate {
        let text = |s: String| {
            let trimmed = s.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        };
        ProductUpdate {
            name: text(self.name),
            hsn_code: text(self.hsn_code),
            stock_quantity: None,
            default_rate_per_kg: parse_optional(&self.default_rate_per_kg),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct StockAdjustForm {
    #[serde(default)]
    #[validate(custom(function = "non_zero_number", message = "Enter a non-zero quantity"))]
    pub quantity: String,
}

impl StockAdjustForm {
    pub fn delta(&self) -> Decimal {
        parse_lenient(&self.quantity)
    }
}

/// Target status posted by the paid/unpaid toggle.
#[derive(Debug, Deserialize, Default)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

impl StatusForm {
    pub fn status(&self) -> InvoiceStatus {
        InvoiceStatus::from_string(&self.status)
    }
}

/// Query string of the list pages: search term plus the notice code set by
/// a redirect after a successful POST.
#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub notice: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatementQuery {
    #[serde(default)]
    pub buyer_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn number_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_optional(value).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("number"))
}

fn non_zero_number(value: &str) -> Result<(), ValidationError> {
    match parse_optional(value) {
        Some(n) if !n.is_zero() => Ok(()),
        _ => Err(ValidationError::new("non_zero")),
    }
}

/// Button pressed on the invoice form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    AddItem,
    RemoveItem(usize),
    PickProduct(usize),
    PickBuyer,
    ClearBuyer,
    Recalculate,
    Save,
}

impl FromStr for EditorAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let index = || {
            arg.and_then(|a| a.trim().parse::<usize>().ok())
                .ok_or_else(|| format!("action {name} needs a row index"))
        };

        match name.trim() {
            "add_item" => Ok(EditorAction::AddItem),
            "remove_item" => Ok(EditorAction::RemoveItem(index()?)),
            "pick_product" => Ok(EditorAction::PickProduct(index()?)),
            "pick_buyer" => Ok(EditorAction::PickBuyer),
            "clear_buyer" => Ok(EditorAction::ClearBuyer),
            "recalculate" | "" => Ok(EditorAction::Recalculate),
            "save" => Ok(EditorAction::Save),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Full snapshot of the invoice form. Item columns arrive as parallel lists,
/// one entry per row.
#[derive(Debug, Deserialize, Default)]
pub struct InvoiceForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub invoice_no: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub buyer_id: String,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cgst_override: String,
    #[serde(default)]
    pub sgst_override: String,
    #[serde(default)]
    pub product_name: Vec<String>,
    #[serde(default)]
    pub hsn_code: Vec<String>,
    #[serde(default)]
    pub packing_qty: Vec<String>,
    #[serde(default)]
    pub no_of_units: Vec<String>,
    #[serde(default)]
    pub rate_per_kg: Vec<String>,
    /// Product chosen in each row's picker, by id.
    #[serde(default)]
    pub product_id: Vec<String>,
}

impl InvoiceForm {
    pub fn action(&self) -> Result<EditorAction, String> {
        self.action.parse()
    }

    fn row_count(&self) -> usize {
        [
            self.product_name.len(),
            self.hsn_code.len(),
            self.packing_qty.len(),
            self.no_of_units.len(),
            self.rate_per_kg.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Replay the posted snapshot through an editor so totals are recomputed
    /// the same way as for any other change.
    pub fn to_editor(&self) -> InvoiceEditor {
        let rows = self.row_count().max(1);
        let invoice = Invoice {
            items: vec![Default::default(); rows],
            status: InvoiceStatus::from_string(&self.status),
            ..Default::default()
        };
        let mut editor = InvoiceEditor::with_mode(invoice, TaxMode::Standard);

        editor.set_invoice_no(&self.invoice_no);
        editor.set_date(&self.date);
        editor.set_buyer_name(&self.buyer_name);
        editor.set_address(&self.address);
        editor.set_gstin(&self.gstin);

        let columns = [
            (ItemField::ProductName, &self.product_name),
            (ItemField::HsnCode, &self.hsn_code),
            (ItemField::PackingQty, &self.packing_qty),
            (ItemField::NoOfUnits, &self.no_of_units),
            (ItemField::RatePerKg, &self.rate_per_kg),
        ];
        for (field, values) in columns {
            for (idx, value) in values.iter().enumerate() {
                editor.update_item(idx, field, value);
            }
        }

        editor.set_tax_override_text(&self.cgst_override, &self.sgst_override);
        editor
    }

    pub fn product_for_row(&self, idx: usize) -> Option<&str> {
        self.product_id
            .get(idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}
