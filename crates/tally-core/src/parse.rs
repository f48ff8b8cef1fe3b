//! # Lenient Numeric Parsing
//!
//! The document editor never rejects numeric input. Whatever the user types
//! into a quantity, rate, tax or discount field is coerced to a number, and
//! anything unusable becomes `0`.
//!
//! ## Coercion Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input              Result     Why                                      │
//! │  ─────────────      ──────     ──────────────────────────────────────   │
//! │  "12.5"             12.5       plain decimal                            │
//! │  "  3"              3          leading whitespace skipped               │
//! │  "12.5kg"           12.5       longest numeric prefix wins              │
//! │  ".5"               0.5        integer part optional                    │
//! │  "-2"               -2         sign kept (strict layer flags it)        │
//! │  "1e2"              100        exponent honoured                        │
//! │  ""  / "abc"        0          nothing numeric                          │
//! │  "NaN" / "Infinity" 0          not representable as a decimal           │
//! │  "1e99"             0          overflows 28 significant digits          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same rules apply to stored records through the `lenient_*`
//! deserializers, so a record holding `"quantity": "3"`, `"quantity": 3`
//! or `"quantity": null` all load.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::money::Money;
use crate::types::Percent;

/// Largest decimal exponent that can still produce a representable value.
const MAX_EXPONENT: i64 = 28;

/// Parses the longest numeric prefix of `input`, or returns zero.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::parse_number_or_zero;
///
/// assert_eq!(parse_number_or_zero("2.5"), Decimal::new(25, 1));
/// assert_eq!(parse_number_or_zero("7 units"), Decimal::from(7));
/// assert_eq!(parse_number_or_zero(""), Decimal::ZERO);
/// assert_eq!(parse_number_or_zero("abc"), Decimal::ZERO);
/// ```
pub fn parse_number_or_zero(input: &str) -> Decimal {
    parse_prefix(input).unwrap_or(Decimal::ZERO)
}

fn parse_prefix(input: &str) -> Option<Decimal> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    let int_len = count_digits(&bytes[pos..]);
    pos += int_len;

    let mut frac_len = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_len = count_digits(&bytes[pos + 1..]);
        // "1." is a number and may still carry an exponent ("1.e5"); "." is not
        if int_len + frac_len > 0 {
            pos += 1 + frac_len;
        }
    }

    if int_len + frac_len == 0 {
        return None;
    }

    let int_part = &s[int_start..int_start + int_len];
    let mut mantissa = String::with_capacity(int_len + frac_len + 3);
    if negative {
        mantissa.push('-');
    }
    mantissa.push_str(if int_part.is_empty() { "0" } else { int_part });
    if frac_len > 0 {
        mantissa.push('.');
        mantissa.push_str(&s[int_start + int_len + 1..int_start + int_len + 1 + frac_len]);
    }

    let value = Decimal::from_str(&mantissa).ok()?;

    match parse_exponent(&bytes[pos..]) {
        Some(exp) => apply_exponent(value, exp),
        None => Some(value),
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Reads `e`/`E`, an optional sign and at least one digit.
fn parse_exponent(bytes: &[u8]) -> Option<i64> {
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return None;
    }

    let mut pos = 1;
    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits = count_digits(&bytes[pos..]);
    if digits == 0 {
        return None;
    }

    let exp = bytes[pos..pos + digits]
        .iter()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as i64));

    Some(if negative { -exp } else { exp })
}

fn apply_exponent(value: Decimal, exp: i64) -> Option<Decimal> {
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }

    let mut result = value;
    if exp >= 0 {
        if exp > MAX_EXPONENT {
            return None;
        }
        for _ in 0..exp {
            result = result.checked_mul(Decimal::TEN)?;
        }
    } else {
        // Past 28 places everything rounds away to zero anyway
        for _ in 0..exp.unsigned_abs().min(MAX_EXPONENT as u64 + 1) {
            result = result.checked_div(Decimal::TEN)?;
        }
    }
    Some(result)
}

/// Coerces an arbitrary JSON value the way a text field would.
///
/// Numbers and strings go through [`parse_number_or_zero`]; booleans,
/// nulls, arrays and objects become zero.
pub fn number_from_json(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_number_or_zero(&n.to_string()),
        Value::String(s) => parse_number_or_zero(s),
        _ => Decimal::ZERO,
    }
}

/// Renders a JSON value as the text a user would have typed.
pub fn text_from_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// `deserialize_with` helper for lenient decimals.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(number_from_json).unwrap_or(Decimal::ZERO))
}

/// `deserialize_with` helper for lenient money amounts.
pub fn lenient_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_decimal(deserializer).map(Money::new)
}

/// `deserialize_with` helper for lenient percentages.
pub fn lenient_percent<'de, D>(deserializer: D) -> Result<Percent, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_decimal(deserializer).map(Percent::new)
}

/// `deserialize_with` helper for item ids stored as numbers or strings.
///
/// Ids that are negative, fractional or unparsable become `0`, which
/// [`LineItems::from_items`](crate::line_item::LineItems::from_items)
/// replaces with a fresh id.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// `deserialize_with` helper for free text that may be stored as a number.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(text_from_json).unwrap_or_default())
}

// =============================================================================
// Unit Tests
// =============================================================================
