//! Canonicalization of forecast payloads.

use crate::model::{Forecast, RawForecast};

pub const DEFAULT_OVERALL: &str = "Moderate";

/// Placeholder shown wherever a value is missing.
pub const PLACEHOLDER: &str = "—";

/// Fill every top-level field of a payload with its default when absent.
///
/// Never fails. Empty strings are kept as sent; rendering decides how to
/// show them.
pub fn normalize(raw: Option<RawForecast>) -> Forecast {
    let raw = raw.unwrap_or_default();

    Forecast {
        overall: raw.overall.unwrap_or_else(|| DEFAULT_OVERALL.to_string()),
        summary: raw.summary.unwrap_or_else(|| PLACEHOLDER.to_string()),
        risks: raw.risks.unwrap_or_default(),
        metrics: raw.metrics.unwrap_or_default(),
        hours: raw.hours.unwrap_or_default(),
    }
}

impl From<RawForecast> for Forecast {
    fn from(raw: RawForecast) -> Self {
        normalize(Some(raw))
    }
}
