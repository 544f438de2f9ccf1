//! Normalization of numeric-encoded ignition timestamps.
//!
//! Source tables store ignition dates as raw numbers: `20210704.0` for a
//! date-only value, `20210704153000.0` for date plus time. Anything whose
//! integer digit string is not exactly 8 or 14 characters long is treated as
//! unknown; there is deliberately no best-effort guessing.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses one numeric timestamp into a calendar timestamp.
///
/// The value is rendered as an integer digit string (never scientific
/// notation) and classified by length: 8 digits parse as `YYYYMMDD` at
/// midnight, 14 digits as `YYYYMMDDhhmmss`. Any other length, a calendar-
/// invalid value (e.g. month 13) or non-finite input yields `None`.
pub fn parse_numeric_timestamp(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() {
        return None;
    }
    let digits = (value as i64).to_string();
    match digits.len() {
        8 => NaiveDate::parse_from_str(&digits, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0)),
        14 => NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S").ok(),
        _ => None,
    }
}

/// Normalizes a column of numeric timestamps, preserving order and length.
///
/// Absent inputs stay unknown; a value that fails to parse degrades to unknown
/// on its own, never affecting its neighbours.
pub fn normalize_timestamps(values: &[Option<f64>]) -> Vec<Option<NaiveDateTime>> {
    values
        .iter()
        .map(|value| value.and_then(parse_numeric_timestamp))
        .collect()
}
