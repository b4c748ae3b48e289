//! Date and timestamp parsing
//!
//! Pure parsing functions plus the single policy function that decides what
//! happens to timestamps that fail to parse.

use super::types::{IngestWarning, TimestampFallback};
use crate::error::{Error, Result};
use arrow::datatypes::TimeUnit;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

/// Largest timestamp a nanosecond column can hold (2262-04-11T23:47:16.854775807)
pub const MAX_TIMESTAMP_NANOS: i64 = i64::MAX;

/// Why a temporal value could not be converted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("cannot parse '{value}' as a date/time")]
    Unparsable { value: String },

    #[error("'{value}' is outside the representable timestamp range")]
    OutOfRange { value: String },
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse a date/time string into a UTC-normalized naive datetime
///
/// With a format, the value must match it (offsets in the format are
/// honoured). Without one, ISO-8601 variants are tried in turn.
pub fn parse_datetime(
    value: &str,
    format: Option<&str>,
) -> std::result::Result<NaiveDateTime, TemporalError> {
    let value = value.trim();

    if let Some(format) = format {
        return DateTime::parse_from_str(value, format)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(value, format))
            .or_else(|_| {
                NaiveDate::parse_from_str(value, format).map(|d| d.and_time(chrono::NaiveTime::MIN))
            })
            .map_err(|_| unparsable(value));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    Err(unparsable(value))
}

fn unparsable(value: &str) -> TemporalError {
    TemporalError::Unparsable {
        value: value.to_string(),
    }
}

/// Nanoseconds since the epoch for a JSON value
///
/// Strings are parsed; integers count `unit`s since the epoch.
pub fn timestamp_nanos(
    value: &Value,
    unit: TimeUnit,
    format: Option<&str>,
) -> std::result::Result<i64, TemporalError> {
    match value {
        Value::String(s) => {
            let parsed = parse_datetime(s, format)?;
            parsed
                .and_utc()
                .timestamp_nanos_opt()
                .ok_or_else(|| TemporalError::OutOfRange { value: s.clone() })
        }
        Value::Number(n) => {
            let count = n.as_i64().ok_or_else(|| unparsable(&n.to_string()))?;
            let factor = match unit {
                TimeUnit::Second => 1_000_000_000,
                TimeUnit::Millisecond => 1_000_000,
                TimeUnit::Microsecond => 1_000,
                TimeUnit::Nanosecond => 1,
            };
            count
                .checked_mul(factor)
                .ok_or_else(|| TemporalError::OutOfRange {
                    value: n.to_string(),
                })
        }
        other => Err(unparsable(&other.to_string())),
    }
}

/// Whole days since 1970-01-01 for a date/time string, rounded down
pub fn days_since_epoch(value: &str) -> std::result::Result<i32, TemporalError> {
    let parsed = parse_datetime(value, None)?;
    let days = parsed.and_utc().timestamp().div_euclid(86_400);
    i32::try_from(days).map_err(|_| TemporalError::OutOfRange {
        value: value.to_string(),
    })
}

/// Decide the stored value for a timestamp that failed to convert
///
/// Under [`TimestampFallback::Clamp`] the maximum timestamp is returned with a
/// warning describing the substitution.
pub fn apply_timestamp_fallback(
    policy: TimestampFallback,
    column: &str,
    row: usize,
    value: &Value,
    error: &TemporalError,
) -> Result<(i64, IngestWarning)> {
    match policy {
        TimestampFallback::Clamp => Ok((
            MAX_TIMESTAMP_NANOS,
            IngestWarning {
                column: column.to_string(),
                row,
                value: value.to_string(),
                message: format!("{error}; clamped to maximum timestamp"),
            },
        )),
        TimestampFallback::Reject => Err(Error::coercion(column, row, error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test_case("2018-01-01 01:02:03")]
    #[test_case("2018-01-01T01:02:03")]
    #[test_case("2018-01-01T01:02:03Z")]
    #[test_case("2018-01-01T03:02:03+02:00")]
    #[test_case("2018-01-01 01:02:03.000")]
    #[test_case("  2018-01-01 01:02:03 ")]
    fn test_parse_iso_variants(text: &str) {
        assert_eq!(parse_datetime(text, None).unwrap(), ymd_hms(2018, 1, 1, 1, 2, 3));
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(
            parse_datetime("2018-01-02", None).unwrap(),
            ymd_hms(2018, 1, 2, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_with_format() {
        assert_eq!(
            parse_datetime("2018/01/01 01:02:03", Some("%Y/%m/%d %H:%M:%S")).unwrap(),
            ymd_hms(2018, 1, 1, 1, 2, 3)
        );
        assert!(parse_datetime("2018-01-01 01:02:03", Some("%Y/%m/%d %H:%M:%S")).is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_datetime("not a date", None),
            Err(TemporalError::Unparsable { .. })
        ));
    }

    #[test]
    fn test_timestamp_nanos_out_of_range() {
        let err = timestamp_nanos(&json!("3000-01-01"), TimeUnit::Nanosecond, None).unwrap_err();
        assert!(matches!(err, TemporalError::OutOfRange { .. }));
    }

    #[test]
    fn test_timestamp_nanos_from_integer_units() {
        assert_eq!(
            timestamp_nanos(&json!(2), TimeUnit::Second, None).unwrap(),
            2_000_000_000
        );
        assert_eq!(
            timestamp_nanos(&json!(2), TimeUnit::Nanosecond, None).unwrap(),
            2
        );
        assert!(timestamp_nanos(&json!(i64::MAX), TimeUnit::Millisecond, None).is_err());
    }

    #[test]
    fn test_days_since_epoch() {
        assert_eq!(days_since_epoch("1970-01-01").unwrap(), 0);
        assert_eq!(days_since_epoch("2018-01-01").unwrap(), 17532);
        assert_eq!(days_since_epoch("1969-12-31T23:00:00").unwrap(), -1);
    }

    #[test]
    fn test_fallback_policies() {
        let error = TemporalError::Unparsable {
            value: "x".to_string(),
        };
        let (nanos, warning) =
            apply_timestamp_fallback(TimestampFallback::Clamp, "ts", 4, &json!("x"), &error)
                .unwrap();
        assert_eq!(nanos, MAX_TIMESTAMP_NANOS);
        assert_eq!(warning.row, 4);
        assert_eq!(warning.column, "ts");

        let err = apply_timestamp_fallback(TimestampFallback::Reject, "ts", 4, &json!("x"), &error)
            .unwrap_err();
        assert_eq!(err.row(), Some(4));
    }
}
