//! Case-insensitive name search for the buyer and product pickers.

use crate::models::{Buyer, Invoice, Product};

/// Something listed by name in a picker.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Buyer {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Product {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Entries whose name contains `term`, in their original order.
/// A blank term matches everything.
pub fn filter_by_name<'a, T: Named>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    items
        .iter()
        .filter(|item| needle.is_empty() || item.name().to_lowercase().contains(&needle))
        .collect()
}

/// Invoices whose number or buyer name contains `term`.
pub fn filter_invoices<'a>(invoices: &'a [Invoice], term: &str) -> Vec<&'a Invoice> {
    let needle = term.trim().to_lowercase();
    invoices
        .iter()
        .filter(|inv| {
            needle.is_empty()
                || inv.invoice_no.to_lowercase().contains(&needle)
                || inv.buyer_name.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyers() -> Vec<Buyer> {
        ["Sai Packaging", "Shree Flexo", "Om Prints"]
            .into_iter()
            .map(|name| Buyer {
                name: name.into(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn matches_substrings_ignoring_case() {
        let list = buyers();
        let hits: Vec<_> = filter_by_name(&list, "FLEX").into_iter().map(|b| b.name.as_str()).collect();
        assert_eq!(hits, vec!["Shree Flexo"]);
    }

    #[test]
    fn blank_term_keeps_everything_in_order() {
        let list = buyers();
        let hits: Vec<_> = filter_by_name(&list, "  ").into_iter().map(|b| b.name.as_str()).collect();
        assert_eq!(hits, vec!["Sai Packaging", "Shree Flexo", "Om Prints"]);
    }

    #[test]
    fn invoices_match_number_or_buyer() {
        let invoices = vec![
            Invoice {
                invoice_no: "INV-101".into(),
                buyer_name: "Sai Packaging".into(),
                ..Default::default()
            },
            Invoice {
                invoice_no: "INV-102".into(),
                buyer_name: "Om Prints".into(),
                ..Default::default()
            },
        ];
        assert_eq!(filter_invoices(&invoices, "102").len(), 1);
        assert_eq!(filter_invoices(&invoices, "sai").len(), 1);
        assert_eq!(filter_invoices(&invoices, "inv").len(), 2);
    }
}
