//! Number and timestamp formatting for the wire contract.
//!
//! Rounding is half away from zero throughout; the device rejects
//! receipts whose totals differ from its own rounding.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round to `dp` decimal places, half away from zero, never negative zero.
pub fn round(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Fixed-point string with exactly `dp` decimals: `12.5` → `"12.50"`.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = round(value, dp);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Monetary amount, 2 decimals.
pub fn money(value: Decimal) -> String {
    fixed(value, 2)
}

/// Quantity or per-unit amount, 3 decimals.
pub fn quantity(value: Decimal) -> String {
    fixed(value, 3)
}

/// Rounded float for the legacy schema.
pub fn float2(value: Decimal) -> f64 {
    round(value, 2).to_f64().unwrap_or(0.0)
}

/// Unrounded float for the legacy schema.
pub fn float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// `YYYY-MM-DD HH:MM:SS`.
pub fn legacy_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// ISO-8601 with seconds precision, no offset: `YYYY-MM-DDTHH:MM:SS`.
pub fn iso_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}
