//! Invoice totals.
//!
//! Line amounts are summed at full precision; rounding to two places happens
//! only in [`crate::format`] when a figure is displayed.

use crate::models::InvoiceLineItem;
use crate::numeric::checked_total;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Central and state GST rates applied when no explicit tax amount is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
}

impl Default for TaxPolicy {
    /// 9% CGST + 9% SGST.
    fn default() -> Self {
        Self {
            cgst_rate: Decimal::new(9, 2),
            sgst_rate: Decimal::new(9, 2),
        }
    }
}

impl TaxPolicy {
    /// Rate as a percentage for labels, e.g. `9.0`.
    pub fn cgst_percent(&self) -> Decimal {
        self.cgst_rate * Decimal::ONE_HUNDRED
    }

    pub fn sgst_percent(&self) -> Decimal {
        self.sgst_rate * Decimal::ONE_HUNDRED
    }
}

/// Externally supplied tax amounts. A `None` side is computed from the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxOverride {
    pub cgst: Option<Decimal>,
    pub sgst: Option<Decimal>,
}

impl TaxOverride {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fixed(cgst: Decimal, sgst: Decimal) -> Self {
        Self {
            cgst: Some(cgst),
            sgst: Some(sgst),
        }
    }
}

/// Derived monetary fields of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total_amount: Decimal,
}

impl InvoiceTotals {
    /// Combined GST, as printed in "GST Amount In Words".
    pub fn gst_total(&self) -> Decimal {
        self.cgst.saturating_add(self.sgst)
    }
}

/// Sum of unrounded line amounts. A line that would overflow the sum is
/// left out.
pub fn subtotal(items: &[InvoiceLineItem]) -> Decimal {
    checked_total(items.iter().map(InvoiceLineItem::amount), "subtotal")
}

/// Compute totals with the default 9% + 9% policy.
pub fn compute_totals(items: &[InvoiceLineItem], taxes: TaxOverride) -> InvoiceTotals {
    compute_totals_with_policy(items, taxes, &TaxPolicy::default())
}

/// Compute totals for `items`.
///
/// Never fails: item figures were already coerced on the way in, an empty
/// list yields all zeros, and negative inputs simply produce negative
/// amounts. Figures beyond the decimal range reset all four fields to zero,
/// so `total_amount` always equals `subtotal + cgst + sgst`.
pub fn compute_totals_with_policy(
    items: &[InvoiceLineItem],
    taxes: TaxOverride,
    policy: &TaxPolicy,
) -> InvoiceTotals {
    let subtotal = subtotal(items);
    let cgst = taxes.cgst.or_else(|| subtotal.checked_mul(policy.cgst_rate));
    let sgst = taxes.sgst.or_else(|| subtotal.checked_mul(policy.sgst_rate));

    let totals = cgst.zip(sgst).and_then(|(cgst, sgst)| {
        let total_amount = subtotal.checked_add(cgst)?.checked_add(sgst)?;
        Some(InvoiceTotals {
            subtotal,
            cgst,
            sgst,
            total_amount,
        })
    });

    totals.unwrap_or_else(|| {
        warn!(%subtotal, ?taxes, "invoice totals out of range, reset to zero");
        InvoiceTotals::default()
    })
}
