//! Input validation applied before anything reaches the store.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::ledger::money;

/// Default ceiling for a single amount.
pub const DEFAULT_MAX_AMOUNT: i64 = 1_000_000_000;
/// Default maximum description length, in characters.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 200;

const ELLIPSIS: &str = "...";
const EMPTY_DESCRIPTION_MARKER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidFormat,
    NotPositive,
    TooLarge { max: Decimal },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidFormat => f.write_str("amount is not a number"),
            ValidationError::NotPositive => f.write_str("amount must be greater than zero"),
            ValidationError::TooLarge { max } => {
                write!(f, "amount must not exceed {}", money::format_amount(*max))
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parses user-entered amounts such as `"1 250,5"` or `"99.99"`.
///
/// Spaces are ignored and a comma is accepted as the decimal separator. The result is rounded to
/// two fraction digits and must be strictly positive and not above `max`.
pub fn parse_amount(input: &str, max: Decimal) -> Result<Decimal, ValidationError> {
    let cleaned: String = input
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    if cleaned.is_empty() {
        return Err(ValidationError::InvalidFormat);
    }
    let amount = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| ValidationError::InvalidFormat)?;
    let amount = money::normalize(amount);
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NotPositive);
    }
    if amount > max {
        return Err(ValidationError::TooLarge { max });
    }
    Ok(amount)
}

/// Trims a free-form description; empty input or `-` means "no description".
///
/// Text longer than `max_chars` is cut and marked with a trailing ellipsis instead of being
/// rejected.
pub fn sanitize_description(input: &str, max_chars: usize) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == EMPTY_DESCRIPTION_MARKER {
        return None;
    }
    if trimmed.chars().count() > max_chars {
        let mut cut: String = trimmed.chars().take(max_chars).collect();
        cut.push_str(ELLIPSIS);
        return Some(cut);
    }
    Some(trimmed.to_string())
}
