//! Row to document mapping
//!
//! Applies the per-field rules on top of [`coerce`]: `_key` cells holding
//! `auto` are left out so the store assigns a key, `passwordHash` values are
//! hashed, keys are stringified and numeric values are rounded to one decimal.

use calamine::Data;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::cell::{as_number, cell_to_value, coerce, number_value};
use crate::api::Document;

pub const KEY_FIELD: &str = "_key";
pub const PASSWORD_FIELD: &str = "passwordHash";
pub const AUTO_KEY: &str = "auto";

/// Build one document from a header row and a data row.
///
/// Columns with a blank header and blank cells are skipped. Never fails:
/// values that match no rule are stored as they are.
pub fn map_row(property_names: &[String], row: &[Data]) -> Document {
    let mut doc = Document::new();

    for (name, cell) in property_names.iter().zip(row) {
        if name.is_empty() {
            continue;
        }

        if name == KEY_FIELD && matches!(cell, Data::String(s) if s == AUTO_KEY) {
            continue;
        }

        let Some(raw) = cell_to_value(cell) else {
            continue;
        };

        doc.insert(name.clone(), map_value(name, coerce(raw)));
    }

    doc
}

/// Field-aware conversion of an already coerced value
fn map_value(name: &str, value: Value) -> Value {
    if value.is_array() {
        return value;
    }

    if name == PASSWORD_FIELD {
        return Value::String(sha256_hex(&value_text(&value)));
    }

    if name == KEY_FIELD {
        return Value::String(value_text(&value));
    }

    match as_number(&value) {
        Some(n) => number_value(round_one_decimal(n)),
        None => value,
    }
}

/// Text form of a scalar as it appears in the sheet
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Unsalted SHA-256, lowercase hex
pub fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Round half away from zero to one decimal place. Magnitudes from 2^52 up
/// are already whole and come back unchanged, so scaling never overflows.
fn round_one_decimal(n: f64) -> f64 {
    const NO_FRACTION: f64 = 4_503_599_627_370_496.0;
    if n.abs() >= NO_FRACTION {
        return n;
    }
    (n * 10.0).round() / 10.0
}
