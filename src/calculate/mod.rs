//! Statistics calculation engine.
//!
//! Turns a raw [`Snapshot`](crate::models::Snapshot) into display metrics:
//! - Percent formatting
//! - Zero-safe ratios
//! - Half-up rounding of averages
//! - The full category/card derivation ([`derive_metrics`])

mod derive;

pub use derive::derive_metrics;

use crate::models::MetricValue;

/// Format a ratio as a percentage with two decimals, e.g. `0.12345` -> `"12.35%"`.
///
/// Halves round away from zero. Non-finite input is not special-cased.
pub fn percentify(ratio: f64) -> String {
    let hundredths = (ratio * 10_000.0).round() / 100.0;
    format!("{:.2}%", hundredths)
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn ratio(numerator: f64, denominator: u32) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator / f64::from(denominator))
    }
}

/// Round half up (toward positive infinity).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half up at two decimals.
pub fn round_2dp(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Percentage metric; unavailable when the denominator is zero.
pub fn percent(numerator: f64, denominator: u32) -> MetricValue {
    match ratio(numerator, denominator) {
        Some(r) => MetricValue::Percent(percentify(r)),
        None => MetricValue::Unavailable,
    }
}

/// Average rounded to an integer; unavailable when the denominator is zero.
pub fn rounded(numerator: f64, denominator: u32) -> MetricValue {
    match ratio(numerator, denominator) {
        Some(r) => MetricValue::Integer(round_half_up(r) as i64),
        None => MetricValue::Unavailable,
    }
}

/// Average rounded to two decimals; unavailable when the denominator is zero.
pub fn rounded_2dp(numerator: f64, denominator: u32) -> MetricValue {
    match ratio(numerator, denominator) {
        Some(r) => MetricValue::Decimal(round_2dp(r)),
        None => MetricValue::Unavailable,
    }
}
