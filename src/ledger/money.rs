//! Decimal amount helpers shared by storage, services, and rendering.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fraction digits every stored amount keeps.
pub const AMOUNT_SCALE: u32 = 2;

/// Rounds an amount to the stored precision (midpoint away from zero).
pub fn normalize(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an amount to integer minor units (cents). `None` when it does not fit an `i64`.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (normalize(amount) * Decimal::ONE_HUNDRED).to_i64()
}

/// Builds an amount from integer minor units.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, AMOUNT_SCALE)
}

/// Formats an amount with thousands separators and two fraction digits, e.g. `-1,234.50`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = normalize(amount);
    let plain = format!("{:.2}", rounded.abs());
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

/// Share of `part` within `whole` as a percentage; `None` when `whole` is zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)?.checked_div(whole)
}
