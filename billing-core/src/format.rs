//! Display formatting for money, quantities, dates and GSTINs.

use crate::models::parse_calendar_date;
use rust_decimal::{Decimal, RoundingStrategy};

/// Length of a well-formed GSTIN.
pub const GSTIN_LEN: usize = 15;

/// Shown in place of a blank GSTIN.
pub const GSTIN_NOT_PROVIDED: &str = "Not Provided";

fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Two fixed decimals, no grouping: `1234.5` -> `"1234.50"`.
pub fn fixed2(value: Decimal) -> String {
    let rounded = round2(value);
    // -0.001 rounds to -0.00
    if rounded.is_zero() {
        return "0.00".to_string();
    }
    rounded.to_string()
}

/// Indian digit grouping with two decimals: `1234567.891` -> `"12,34,567.89"`.
pub fn inr(value: Decimal) -> String {
    let fixed = fixed2(value);
    let (negative, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = group_indian(whole);
    if negative {
        grouped.insert(0, '-');
    }
    format!("{grouped}.{fraction}")
}

/// Last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Quantity with trailing zeros trimmed: `2.500` -> `"2.5"`, `20.00` -> `"20"`.
pub fn quantity(value: Decimal) -> String {
    let normalized = value.normalize();
    if normalized.is_zero() {
        return "0".to_string();
    }
    normalized.to_string()
}

/// Invoice header date, e.g. `"05 Jan 2025"`. Unparseable input is echoed.
pub fn invoice_date(raw: &str) -> String {
    match parse_calendar_date(raw) {
        Some(date) => date.format("%d %b %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Statement row date, e.g. `"5/1/2025"`. Unparseable input is echoed.
pub fn statement_date(raw: &str) -> String {
    match parse_calendar_date(raw) {
        Some(date) => date.format("%-d/%-m/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// GSTIN as printed: trimmed and upper-cased, or [`GSTIN_NOT_PROVIDED`].
pub fn gstin_display(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return GSTIN_NOT_PROVIDED.to_string();
    }
    let gstin = trimmed.to_uppercase();
    if gstin.chars().count() != GSTIN_LEN {
        tracing::warn!(gstin = %gstin, expected = GSTIN_LEN, "GSTIN has unexpected length");
    }
    gstin
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn fixed_two_decimals() {
        assert_eq!(fixed2(d("1234.5")), "1234.50");
        assert_eq!(fixed2(d("0.125")), "0.13");
        assert_eq!(fixed2(d("7")), "7.00");
        assert_eq!(fixed2(d("-0.001")), "0.00");
        assert_eq!(fixed2(d("-12.345")), "-12.35");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(inr(d("1234567.891")), "12,34,567.89");
        assert_eq!(inr(d("100")), "100.00");
        assert_eq!(inr(d("1000")), "1,000.00");
        assert_eq!(inr(d("100000")), "1,00,000.00");
        assert_eq!(inr(d("123456789")), "12,34,56,789.00");
        assert_eq!(inr(d("-1234567")), "-12,34,567.00");
    }

    #[test]
    fn quantities_trim_trailing_zeros() {
        assert_eq!(quantity(d("2.500")), "2.5");
        assert_eq!(quantity(d("20.00")), "20");
        assert_eq!(quantity(d("0.000")), "0");
    }

    #[test]
    fn dates() {
        assert_eq!(invoice_date("2025-01-05"), "05 Jan 2025");
        assert_eq!(statement_date("2025-01-05"), "5/1/2025");
        assert_eq!(statement_date("Sun, 05 Jan 2025 00:00:00 GMT"), "5/1/2025");
        assert_eq!(invoice_date("next week"), "next week");
    }

    #[test]
    fn gstin() {
        assert_eq!(gstin_display("   "), GSTIN_NOT_PROVIDED);
        assert_eq!(gstin_display(" 27abcde1234f1z5 "), "27ABCDE1234F1Z5");
        assert_eq!(gstin_display("short"), "SHORT");
    }
}
