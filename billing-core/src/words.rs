//! Rupee amounts in words, Indian numbering system.
//!
//! Groups are Hundred, Thousand, Lakh (10^5) and Crore (10^7). Amounts of a
//! hundred crore and above recurse on the crore count, so `10^10` reads
//! "One Thousand Crore".

use crate::numeric::to_safe_number;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Returned for amounts below zero.
pub const INVALID_AMOUNT: &str = "Invalid Amount";

/// Returned when the amount cannot be decomposed into words.
pub const CALCULATION_ERROR: &str = "Amount Calculation Error";

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Render `amount` as `"<words> Rupees[ and <words> Paise] Only"`.
///
/// The amount is rounded to whole paise first. Zero reads "Zero Rupees
/// Only", anything negative reads [`INVALID_AMOUNT`], and an amount too
/// large to decompose reads [`CALCULATION_ERROR`]. This function never
/// panics; its output goes straight onto a printed invoice.
pub fn amount_in_words(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        return INVALID_AMOUNT.to_string();
    }

    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return "Zero Rupees Only".to_string();
    }

    match split_rupees_paise(rounded) {
        Some((rupees, paise)) => {
            let rupee_words = if rupees == 0 {
                "Zero".to_string()
            } else {
                number_in_words(rupees)
            };

            let mut text = format!("{rupee_words} Rupees");
            if paise > 0 {
                text.push_str(" and ");
                text.push_str(&number_in_words(paise));
                text.push_str(" Paise");
            }
            text.push_str(" Only");
            text
        }
        None => {
            tracing::error!(amount = %amount, "amount could not be converted to words");
            CALCULATION_ERROR.to_string()
        }
    }
}

/// [`amount_in_words`] for an uncoerced JSON value; non-numeric input reads
/// as zero.
pub fn amount_in_words_value(value: &Value) -> String {
    amount_in_words(to_safe_number(value))
}

fn split_rupees_paise(amount: Decimal) -> Option<(u64, u64)> {
    let whole = amount.trunc();
    let rupees = whole.to_u64()?;
    let paise = ((amount - whole) * Decimal::ONE_HUNDRED).trunc().to_u64()?;
    if paise > 99 {
        return None;
    }
    Some((rupees, paise))
}

/// Words for a positive integer, e.g. `12_34_567` ->
/// "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven".
/// Zero yields an empty string.
pub fn number_in_words(n: u64) -> String {
    let mut words = Vec::new();
    push_words(n, &mut words);
    words.join(" ")
}

fn push_words(n: u64, out: &mut Vec<&'static str>) {
    match n {
        0 => {}
        1..=19 => out.push(ONES[n as usize]),
        20..=99 => {
            out.push(TENS[(n / 10) as usize]);
            push_words(n % 10, out);
        }
        100..=999 => {
            out.push(ONES[(n / 100) as usize]);
            out.push("Hundred");
            push_words(n % 100, out);
        }
        _ if n < LAKH => {
            push_words(n / THOUSAND, out);
            out.push("Thousand");
            push_words(n % THOUSAND, out);
        }
        _ if n < CRORE => {
            push_words(n / LAKH, out);
            out.push("Lakh");
            push_words(n % LAKH, out);
        }
        _ => {
            push_words(n / CRORE, out);
            out.push("Crore");
            push_words(n % CRORE, out);
        }
    }
}
