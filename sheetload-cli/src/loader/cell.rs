//! Cell value conversion and coercion
//!
//! `cell_to_value` turns a calamine cell into JSON. Formula cells arrive as
//! their cached result, so by the time a value reaches `coerce` any formula has
//! been unwrapped. `coerce` then expands inline list literals like
//! `[1, 2, three]` and leaves every other value untouched.

use calamine::Data;
use chrono::{Duration, NaiveDate};
use serde_json::{Number, Value};

/// Convert an Excel cell to a JSON value. Blank cells yield `None`.
pub fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(number_value(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) if dt.is_duration() => Some(number_value(dt.as_f64())),
        Data::DateTime(dt) => Some(
            excel_serial_to_iso(dt.as_f64())
                .map(Value::String)
                .unwrap_or_else(|| number_value(dt.as_f64())),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(_) => None,
    }
}

/// Whole numbers become JSON integers, everything else a float
pub fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Excel serial date (1900 system) to an ISO 8601 timestamp
fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let datetime = epoch.checked_add_signed(Duration::try_milliseconds(millis)?)?;
    Some(datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Parse text as a finite number. Total: anything else is `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Numeric reading of a value: numbers themselves, or strings that parse
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Whether a string is an inline list literal: `[` ... `]` after trimming
pub fn is_list_literal(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// Split an inline list literal into numbers and trimmed strings.
///
/// `[]` and brackets around only whitespace give an empty list. Empty
/// elements between commas are kept as empty strings.
pub fn parse_list_literal(s: &str) -> Vec<Value> {
    let trimmed = s.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();

    if inner.is_empty() {
        return Vec::new();
    }

    inner
        .split(',')
        .map(str::trim)
        .map(|item| match parse_number(item) {
            Some(n) => number_value(n),
            None => Value::String(item.to_string()),
        })
        .collect()
}

/// Expand list literals; return every other value unchanged
pub fn coerce(value: Value) -> Value {
    match value {
        Value::String(s) if is_list_literal(&s) => Value::Array(parse_list_literal(&s)),
        other => other,
    }
}
