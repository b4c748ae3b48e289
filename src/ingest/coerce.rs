//! Declared-type coercions
//!
//! One builder per type descriptor. Each reports the column and row of the
//! first value it cannot convert.

use super::temporal::{apply_timestamp_fallback, days_since_epoch, timestamp_nanos};
use super::types::{IngestOptions, IngestWarning};
use crate::error::{Error, Result};
use crate::types::{decimal_in_range, TypeDescriptor};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Decimal128Array, Float32Array, Float64Array, Int64Array,
    PrimitiveArray, StringArray, TimestampNanosecondArray,
};
use arrow::datatypes::{ArrowPrimitiveType, Int16Type, Int32Type, TimeUnit};
use serde_json::Value;
use std::sync::Arc;

/// Build the array for a column with a declared type
pub fn coerce_column(
    column: &str,
    values: &[Option<&Value>],
    target: &TypeDescriptor,
    options: &IngestOptions,
    warnings: &mut Vec<IngestWarning>,
) -> Result<ArrayRef> {
    let array: ArrayRef = match target {
        TypeDescriptor::Timestamp { unit, timezone } => {
            build_timestamp(column, values, *unit, timezone.as_deref(), options, warnings)?
        }
        TypeDescriptor::Date32 => Arc::new(build_date32(column, values)?),
        TypeDescriptor::Float64 => Arc::new(build_float64(column, values)?),
        TypeDescriptor::Float32 => Arc::new(build_float32(column, values)?),
        TypeDescriptor::Int32 => Arc::new(narrow::<Int32Type>(
            column,
            &build_int64(column, values)?,
        )?),
        TypeDescriptor::Int16 => Arc::new(narrow::<Int16Type>(
            column,
            &build_int64(column, values)?,
        )?),
        TypeDescriptor::Boolean => Arc::new(build_boolean(column, values)?),
        TypeDescriptor::Int64 => Arc::new(build_int64(column, values)?),
        TypeDescriptor::Utf8 => Arc::new(build_utf8(column, values)?),
        TypeDescriptor::Decimal { precision, scale } => {
            Arc::new(build_decimal(column, values, *precision, *scale)?)
        }
    };

    tracing::debug!(column, target = %target, rows = array.len(), "Coerced column");
    Ok(array)
}

/// Map each non-null value through `convert`, keeping nulls
fn convert_each<T>(
    column: &str,
    values: &[Option<&Value>],
    expected: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => convert(v).map(Some).ok_or_else(|| {
                Error::coercion(column, row, format!("expected {expected}, got {}", describe(v)))
            }),
        })
        .collect()
}

/// Short JSON rendering of a value for error messages
fn describe(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 64 {
        let head: String = text.chars().take(61).collect();
        format!("{head}...")
    } else {
        text
    }
}

fn build_timestamp(
    column: &str,
    values: &[Option<&Value>],
    unit: TimeUnit,
    timezone: Option<&str>,
    options: &IngestOptions,
    warnings: &mut Vec<IngestWarning>,
) -> Result<ArrayRef> {
    let format = options.date_format.as_deref();
    let mut nanos: Vec<Option<i64>> = Vec::with_capacity(values.len());

    for (row, value) in values.iter().enumerate() {
        let converted = match value {
            None | Some(Value::Null) => None,
            Some(v) => match timestamp_nanos(v, unit, format) {
                Ok(n) => Some(n),
                Err(err) => {
                    let (n, warning) =
                        apply_timestamp_fallback(options.timestamp_fallback, column, row, v, &err)?;
                    tracing::warn!(column, row, value = %v, "{}", warning.message);
                    warnings.push(warning);
                    Some(n)
                }
            },
        };
        nanos.push(converted);
    }

    Ok(Arc::new(
        TimestampNanosecondArray::from(nanos).with_timezone_opt(timezone),
    ))
}

fn build_date32(column: &str, values: &[Option<&Value>]) -> Result<Date32Array> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => days_since_epoch(s)
                .map(Some)
                .map_err(|e| Error::coercion(column, row, e.to_string())),
            Some(v) => Err(Error::coercion(
                column,
                row,
                format!("expected date string, got {}", describe(v)),
            )),
        })
        .collect()
}

fn build_float64(column: &str, values: &[Option<&Value>]) -> Result<Float64Array> {
    convert_each(column, values, "number", Value::as_f64).map(Float64Array::from)
}

/// Goes through f64 and narrows, rejecting finite values beyond the f32 range
fn build_float32(column: &str, values: &[Option<&Value>]) -> Result<Float32Array> {
    let wide = convert_each(column, values, "number or numeric string", |v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })?;

    wide.into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() && (v as f32).is_infinite() => Err(Error::coercion(
                column,
                row,
                format!("{v} is outside the float32 range"),
            )),
            other => Ok(other.map(|v| v as f32)),
        })
        .collect()
}

/// Integral JSON numbers, including floats with no fractional part
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn build_int64(column: &str, values: &[Option<&Value>]) -> Result<Int64Array> {
    convert_each(column, values, "integer", as_integer).map(Int64Array::from)
}

/// Checked narrowing of an Int64 array
fn narrow<T>(column: &str, wide: &Int64Array) -> Result<PrimitiveArray<T>>
where
    T: ArrowPrimitiveType,
    T::Native: TryFrom<i64>,
{
    wide.iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(|v| {
                    T::Native::try_from(v).map_err(|_| {
                        Error::coercion(column, row, format!("{v} overflows {}", T::DATA_TYPE))
                    })
                })
                .transpose()
        })
        .collect()
}

/// Booleans as-is; numbers map 0 to false and anything else to true
fn build_boolean(column: &str, values: &[Option<&Value>]) -> Result<BooleanArray> {
    convert_each(column, values, "boolean or number", |v| match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    })
    .map(BooleanArray::from)
}

fn build_utf8(column: &str, values: &[Option<&Value>]) -> Result<StringArray> {
    convert_each(column, values, "string", |v| v.as_str().map(ToString::to_string))
        .map(StringArray::from)
}

fn build_decimal(
    column: &str,
    values: &[Option<&Value>],
    precision: u8,
    scale: i8,
) -> Result<Decimal128Array> {
    if !decimal_in_range(precision, scale) {
        return Err(Error::InvalidType {
            value: TypeDescriptor::decimal(precision, scale).to_string(),
        });
    }

    let unscaled: Vec<Option<i128>> = values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            let text = match value {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) => s.trim().to_string(),
                Some(v) => {
                    return Err(Error::coercion(
                        column,
                        row,
                        format!("expected decimal, got {}", describe(v)),
                    ))
                }
            };
            parse_decimal(&text, precision, scale)
                .map(Some)
                .map_err(|message| Error::coercion(column, row, message))
        })
        .collect::<Result<_>>()?;

    Ok(Decimal128Array::from(unscaled).with_precision_and_scale(precision, scale)?)
}

/// Exact parse of a decimal literal into its unscaled representation
pub(crate) fn parse_decimal(
    text: &str,
    precision: u8,
    scale: i8,
) -> std::result::Result<i128, String> {
    let invalid = || format!("'{text}' is not a decimal number");
    let overflow = || format!("'{text}' does not fit decimal({precision}, {scale})");

    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (mantissa, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (
            &rest[..idx],
            rest[idx + 1..].parse::<i32>().map_err(|_| invalid())?,
        ),
        None => (rest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(invalid());
    }

    let frac_len = i32::try_from(frac_part.len()).map_err(|_| invalid())?;
    let mut digits = format!("{int_part}{frac_part}");
    let mut shift = exponent
        .checked_sub(frac_len)
        .and_then(|v| v.checked_add(i32::from(scale)))
        .ok_or_else(overflow)?;
    if shift < 0 {
        let keep = digits.len().saturating_sub(shift.unsigned_abs() as usize);
        if digits[keep..].bytes().any(|b| b != b'0') {
            return Err(format!("'{text}' has more than {scale} fractional digits"));
        }
        digits.truncate(keep);
        shift = 0;
    }

    let mut unscaled: i128 = 0;
    for b in digits.trim_start_matches('0').bytes() {
        unscaled = unscaled
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(b - b'0')))
            .ok_or_else(overflow)?;
    }
    if unscaled != 0 {
        for _ in 0..shift {
            unscaled = unscaled.checked_mul(10).ok_or_else(overflow)?;
        }
    }
    let limit = 10_i128.checked_pow(u32::from(precision)).ok_or_else(overflow)?;
    if unscaled >= limit {
        return Err(overflow());
    }

    Ok(if negative { -unscaled } else { unscaled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("12.34", 10, 2, 1234)]
    #[test_case("-12.3", 10, 2, -1230)]
    #[test_case("7", 5, 0, 7)]
    #[test_case("1.5e2", 6, 1, 1500)]
    #[test_case("1.20", 4, 1, 12)]
    #[test_case("0.000", 4, 2, 0)]
    #[test_case("1e-2", 4, 2, 1)]
    fn test_parse_decimal(text: &str, precision: u8, scale: i8, expected: i128) {
        assert_eq!(parse_decimal(text, precision, scale).unwrap(), expected);
    }

    #[test_case("1.234", 10, 2; "too many fractional digits")]
    #[test_case("123456", 5, 0; "exceeds precision")]
    #[test_case("abc", 5, 0; "not a number")]
    #[test_case("1.2.3", 5, 1; "two points")]
    #[test_case("", 5, 1; "empty")]
    #[test_case("1e2147483647", 10, 2; "exponent overflows shift")]
    #[test_case("1e-2147483648", 10, 2; "fraction beyond scale at minimum exponent")]
    #[test_case("1", 39, 0; "precision beyond i128")]
    fn test_parse_decimal_rejects(text: &str, precision: u8, scale: i8) {
        assert!(parse_decimal(text, precision, scale).is_err());
    }

    #[test]
    fn test_describe_truncates() {
        let long = Value::String("x".repeat(200));
        assert!(describe(&long).ends_with("..."));
        assert_eq!(describe(&Value::Bool(true)), "true");
    }
}
