//! Lenient numeric coercion.
//!
//! Invoice figures arrive from HTML forms and from a schemaless backend, so a
//! field may hold a JSON number, a numeric string, an empty string, `null` or
//! something else entirely. Anything that is not a finite number becomes zero.
//! This is the only place that decides what "not a number" means; the totals,
//! words and statement code all go through it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Coerce an arbitrary JSON value into a decimal, defaulting to zero.
///
/// Numbers and numeric strings (including exponent notation) are accepted.
/// Booleans, arrays, objects, `null` and unparseable strings yield zero.
pub fn to_safe_number(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_lenient(&n.to_string()),
        Value::String(s) => parse_lenient(s),
        _ => Decimal::ZERO,
    }
}

/// Sum decimals, leaving out any term that would overflow the running total.
///
/// `what` names the figure in the warning that is logged for each skipped term.
pub fn checked_total<I>(values: I, what: &'static str) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).unwrap_or_else(|| {
            warn!(%acc, %value, what, "sum out of range, term left out");
            acc
        })
    })
}

/// Parse user or wire text into a decimal, defaulting to zero.
pub fn parse_lenient(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Like [`parse_lenient`] but keeps "no value" distinct from zero.
pub fn parse_optional(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// `deserialize_with` helper: any value (or `null`) becomes a decimal.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(to_safe_number).unwrap_or_default())
}

/// `deserialize_with` helper: strings pass through, numbers are stringified,
/// everything else becomes an empty string.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checked_total_skips_overflowing_terms() {
        let total = checked_total([Decimal::MAX, Decimal::MAX, Decimal::NEGATIVE_ONE], "test");
        assert_eq!(total, Decimal::MAX - Decimal::ONE);
        assert_eq!(checked_total(Vec::<Decimal>::new(), "test"), Decimal::ZERO);
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(to_safe_number(&json!(12)), Decimal::from(12));
        assert_eq!(to_safe_number(&json!(2.5)), Decimal::new(25, 1));
        assert_eq!(to_safe_number(&json!(" 7.25 ")), Decimal::new(725, 2));
        assert_eq!(to_safe_number(&json!("1e3")), Decimal::from(1000));
        assert_eq!(to_safe_number(&json!("-4")), Decimal::from(-4));
    }

    #[test]
    fn everything_else_is_zero() {
        for value in [
            json!(null),
            json!(""),
            json!("abc"),
            json!("1,000"),
            json!(true),
            json!([1]),
            json!({"n": 1}),
        ] {
            assert_eq!(to_safe_number(&value), Decimal::ZERO, "value {value}");
        }
    }

    #[test]
    fn float_input_keeps_its_shortest_representation() {
        // 0.1 must not pick up binary noise from f64.
        assert_eq!(to_safe_number(&json!(0.1)).to_string(), "0.1");
    }

    #[test]
    fn optional_parse_distinguishes_blank() {
        assert_eq!(parse_optional("  "), None);
        assert_eq!(parse_optional("x"), None);
        assert_eq!(parse_optional("18.5"), Some(Decimal::new(185, 1)));
    }
}
