//! Invoice editor.
//!
//! Owns the invoice being created or edited and recomputes its totals after
//! every change, so a draft can never show a subtotal that disagrees with its
//! rows. Index-addressed operations ignore out-of-range positions instead of
//! panicking; the form that sent them may simply be stale.

use crate::error::Error;
use crate::format::GSTIN_LEN;
use crate::models::{Buyer, Invoice, InvoiceLineItem, InvoiceStatus, Product};
use crate::numeric::{parse_lenient, parse_optional};
use crate::totals::{compute_totals_with_policy, InvoiceTotals, TaxOverride, TaxPolicy};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{debug, warn};

/// How CGST and SGST are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxMode {
    /// Computed from the subtotal with the tax policy.
    #[default]
    Standard,
    /// Fixed amounts; a `None` side still follows the policy.
    Manual(TaxOverride),
}

impl TaxMode {
    fn as_override(&self) -> TaxOverride {
        match self {
            TaxMode::Standard => TaxOverride::none(),
            TaxMode::Manual(taxes) => *taxes,
        }
    }
}

/// Editable column of a line item, named as in the form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    ProductName,
    PackingQty,
    NoOfUnits,
    RatePerKg,
    HsnCode,
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_name" | "description" => Ok(ItemField::ProductName),
            "packing_qty" => Ok(ItemField::PackingQty),
            "no_of_units" | "units" => Ok(ItemField::NoOfUnits),
            "rate_per_kg" => Ok(ItemField::RatePerKg),
            "hsn_code" => Ok(ItemField::HsnCode),
            other => Err(format!("unknown item field: {other}")),
        }
    }
}

/// Draft invoice plus the tax mode used to recompute it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceEditor {
    invoice: Invoice,
    tax_mode: TaxMode,
    policy: TaxPolicy,
}

impl InvoiceEditor {
    /// Blank invoice with one empty row.
    pub fn new_draft(invoice_no: impl Into<String>, date: impl Into<String>) -> Self {
        let invoice = Invoice {
            invoice_no: invoice_no.into(),
            date: date.into(),
            items: vec![InvoiceLineItem::default()],
            status: InvoiceStatus::Unpaid,
            ..Default::default()
        };
        Self::with_mode(invoice, TaxMode::Standard)
    }

    /// Start editing a stored invoice.
    ///
    /// Stored taxes that match the policy (to the paisa) keep following it,
    /// as does a record with no derived figures at all. Anything else was
    /// entered by hand and is preserved as given.
    pub fn from_invoice(invoice: Invoice) -> Self {
        let policy = TaxPolicy::default();
        let subtotal = crate::totals::subtotal(&invoice.items);
        let tolerance = Decimal::new(1, 2);
        let within = |stored: Decimal, rate: Decimal| {
            subtotal
                .checked_mul(rate)
                .and_then(|expected| stored.checked_sub(expected))
                .is_some_and(|diff| diff.abs() <= tolerance)
        };
        let matches_policy =
            within(invoice.cgst, policy.cgst_rate) && within(invoice.sgst, policy.sgst_rate);
        let never_computed = invoice.subtotal.is_zero()
            && invoice.cgst.is_zero()
            && invoice.sgst.is_zero()
            && invoice.total_amount.is_zero();

        let mode = if matches_policy || never_computed {
            TaxMode::Standard
        } else {
            debug!(
                invoice_no = %invoice.invoice_no,
                cgst = %invoice.cgst,
                sgst = %invoice.sgst,
                "keeping stored tax amounts"
            );
            TaxMode::Manual(TaxOverride::fixed(invoice.cgst, invoice.sgst))
        };
        Self::with_mode(invoice, mode)
    }

    /// Rebuild an editor from a submitted form snapshot with an explicit mode.
    pub fn with_mode(invoice: Invoice, tax_mode: TaxMode) -> Self {
        let mut editor = Self {
            invoice,
            tax_mode,
            policy: TaxPolicy::default(),
        };
        editor.recalculate();
        editor
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn tax_mode(&self) -> TaxMode {
        self.tax_mode
    }

    pub fn policy(&self) -> &TaxPolicy {
        &self.policy
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.invoice.subtotal,
            cgst: self.invoice.cgst,
            sgst: self.invoice.sgst,
            total_amount: self.invoice.total_amount,
        }
    }

    pub fn set_invoice_no(&mut self, value: &str) {
        self.invoice.invoice_no = value.trim().to_string();
    }

    pub fn set_date(&mut self, value: &str) {
        self.invoice.date = value.trim().to_string();
    }

    pub fn set_buyer_name(&mut self, value: &str) {
        self.invoice.buyer_name = value.to_string();
    }

    pub fn set_address(&mut self, value: &str) {
        self.invoice.address = value.to_string();
    }

    pub fn set_gstin(&mut self, value: &str) {
        self.invoice.gstin = value.trim().to_string();
    }

    pub fn set_status(&mut self, status: InvoiceStatus) {
        self.invoice.status = status;
    }

    pub fn add_item(&mut self) {
        self.invoice.items.push(InvoiceLineItem::default());
        self.recalculate();
    }

    /// Remove row `idx`. The last remaining row is never removed.
    pub fn remove_item(&mut self, idx: usize) -> bool {
        if idx >= self.invoice.items.len() {
            warn!(idx, rows = self.invoice.items.len(), "remove_item out of range");
            return false;
        }
        if self.invoice.items.len() == 1 {
            debug!("refusing to remove the only row");
            return false;
        }
        self.invoice.items.remove(idx);
        self.recalculate();
        true
    }

    /// Set one column of row `idx` from raw form text.
    pub fn update_item(&mut self, idx: usize, field: ItemField, raw: &str) -> bool {
        let Some(item) = self.invoice.items.get_mut(idx) else {
            warn!(idx, ?field, "update_item out of range");
            return false;
        };

        match field {
            ItemField::ProductName => item.product_name = raw.to_string(),
            ItemField::HsnCode => item.hsn_code = raw.trim().to_string(),
            ItemField::PackingQty => item.packing_qty = figure(idx, field, raw),
            ItemField::NoOfUnits => item.no_of_units = figure(idx, field, raw),
            ItemField::RatePerKg => item.rate_per_kg = figure(idx, field, raw),
        }
        self.recalculate();
        true
    }

    /// Pre-fill row `idx` from a stock item.
    ///
    /// The name is always copied; the rate only when the product has one and
    /// the HSN code only when it is not blank.
    pub fn select_product(&mut self, idx: usize, product: &Product) -> bool {
        let Some(item) = self.invoice.items.get_mut(idx) else {
            warn!(idx, product = %product.name, "select_product out of range");
            return false;
        };

        item.product_name = product.name.clone();
        if !product.default_rate_per_kg.is_zero() {
            item.rate_per_kg = product.default_rate_per_kg;
        }
        if !product.hsn_code.trim().is_empty() {
            item.hsn_code = product.hsn_code.trim().to_string();
        }
        self.recalculate();
        true
    }

    /// Copy the buyer's details onto the invoice.
    pub fn select_buyer(&mut self, buyer: &Buyer) {
        self.invoice.buyer_name = buyer.name.clone();
        self.invoice.address = buyer.address.clone();
        self.invoice.gstin = buyer.gstin.clone();
    }

    pub fn clear_buyer(&mut self) {
        self.invoice.buyer_name.clear();
        self.invoice.address.clear();
        self.invoice.gstin.clear();
    }

    /// Fix CGST/SGST. Passing [`TaxOverride::none`] returns to computed taxes.
    pub fn set_tax_override(&mut self, taxes: TaxOverride) {
        self.tax_mode = if taxes == TaxOverride::none() {
            TaxMode::Standard
        } else {
            TaxMode::Manual(taxes)
        };
        self.recalculate();
    }

    /// Form-text variant of [`Self::set_tax_override`]; blank means computed.
    pub fn set_tax_override_text(&mut self, cgst: &str, sgst: &str) {
        self.set_tax_override(TaxOverride {
            cgst: parse_optional(cgst),
            sgst: parse_optional(sgst),
        });
    }

    /// Check the fields the backend requires. Returns non-blocking warnings.
    pub fn validate_for_save(&self) -> Result<Vec<String>, Error> {
        let inv = &self.invoice;
        let missing: Vec<&'static str> = [
            ("invoice_no", inv.invoice_no.as_str()),
            ("date", inv.date.as_str()),
            ("buyer_name", inv.buyer_name.as_str()),
            ("address", inv.address.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        let mut warnings = Vec::new();
        let gstin = inv.gstin.trim();
        if !gstin.is_empty() && gstin.chars().count() != GSTIN_LEN {
            warnings.push(format!(
                "GSTIN should be {GSTIN_LEN} characters, got {}",
                gstin.chars().count()
            ));
        }
        if inv.calendar_date().is_none() {
            warnings.push(format!("Date '{}' is not in YYYY-MM-DD form", inv.date));
        }
        if inv.items.iter().all(|item| item.product_name.trim().is_empty()) {
            warnings.push("Invoice has no named items".to_string());
        }
        Ok(warnings)
    }

    /// Request body for `POST /invoices` and `PUT /invoices/:id`.
    pub fn payload(&self) -> Value {
        let inv = &self.invoice;
        json!({
            "invoice_no": inv.invoice_no,
            "date": inv.date,
            "buyer_name": inv.buyer_name,
            "address": inv.address,
            "gstin": inv.gstin,
            "items": inv.items,
            "subtotal": inv.subtotal,
            "cgst": inv.cgst,
            "sgst": inv.sgst,
            "total_amount": inv.total_amount,
            "status": inv.status,
        })
    }

    pub fn into_invoice(self) -> Invoice {
        self.invoice
    }

    fn recalculate(&mut self) {
        let totals =
            compute_totals_with_policy(&self.invoice.items, self.tax_mode.as_override(), &self.policy);
        self.invoice.subtotal = totals.subtotal;
        self.invoice.cgst = totals.cgst;
        self.invoice.sgst = totals.sgst;
        self.invoice.total_amount = totals.total_amount;
    }
}

fn figure(idx: usize, field: ItemField, raw: &str) -> Decimal {
    let value = parse_lenient(raw);
    if value.is_sign_negative() && !value.is_zero() {
        warn!(idx, ?field, %value, "negative line item value");
    }
    value
}
