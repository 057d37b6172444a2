//! Canonical last-updated timestamps.
//!
//! Stores record a last-updated value in whatever raw form their backing
//! engine produces. Comparison and high-water-mark arithmetic happen on a
//! single canonical type, [`Timestamp`]; each store designates one
//! normalization function that converts its raw values into it.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

/// The canonical comparable form of a last-updated value.
pub type Timestamp = DateTime<Utc>;

/// A named normalization strategy from raw field values to [`Timestamp`].
pub type LuNormalizer = fn(&Value) -> Result<Timestamp, NormalizeError>;

/// Raw value could not be interpreted as a timestamp.
#[derive(Debug, Clone, Error)]
#[error("cannot interpret {raw} as a timestamp")]
pub struct NormalizeError {
    /// Display form of the offending raw value.
    pub raw: String,
}

impl NormalizeError {
    fn new(raw: &Value) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }
}

/// Integer values at or above this magnitude are taken as epoch milliseconds.
const EPOCH_MILLIS_CUTOVER: i64 = 1_000_000_000_000;

/// Default normalization strategy.
///
/// Accepts:
/// - RFC 3339 strings (`"2024-05-01T12:00:00Z"`, offsets allowed)
/// - naive datetime strings (`"2024-05-01T12:00:00"` or with a space
///   separator), taken as UTC
/// - integer epoch seconds, or epoch milliseconds above the cutover
/// - float epoch seconds with fractional part
pub fn normalize(raw: &Value) -> Result<Timestamp, NormalizeError> {
    match raw {
        Value::String(text) => parse_text(text).ok_or_else(|| NormalizeError::new(raw)),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                let parsed = if int.abs() >= EPOCH_MILLIS_CUTOVER {
                    DateTime::from_timestamp_millis(int)
                } else {
                    DateTime::from_timestamp(int, 0)
                };
                parsed.ok_or_else(|| NormalizeError::new(raw))
            } else if let Some(float) = number.as_f64() {
                let seconds = float.floor();
                let nanos = ((float - seconds) * 1e9).round() as u32;
                DateTime::from_timestamp(seconds as i64, nanos)
                    .ok_or_else(|| NormalizeError::new(raw))
            } else {
                Err(NormalizeError::new(raw))
            }
        }
        _ => Err(NormalizeError::new(raw)),
    }
}

fn parse_text(text: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Serializes a canonical timestamp back into a document field value.
///
/// RFC 3339 with microsecond precision, always in UTC.
pub fn to_value(ts: Timestamp) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}
