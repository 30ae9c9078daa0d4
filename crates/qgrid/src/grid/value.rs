//! Cell values and the canonical text formatter.
//!
//! Every place that turns a raw value into text (rendering, seeding an edit
//! buffer, deciding whether an edit is a no-op, copying) goes through
//! [`format_cell`], so the text a user sees is exactly the text they edit.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

/// A single value in a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum CellValue {
    Null,
    Number(Number),
    Bool(bool),
    Text(String),
    /// Arrays and objects (json/jsonb columns, composite values).
    Structured(JsonValue),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn int(n: i64) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<JsonValue> for CellValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Bool(b),
            JsonValue::Number(n) => CellValue::Number(n),
            JsonValue::String(s) => CellValue::Text(s),
            v @ (JsonValue::Array(_) | JsonValue::Object(_)) => CellValue::Structured(v),
        }
    }
}

impl From<CellValue> for JsonValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Null => JsonValue::Null,
            CellValue::Bool(b) => JsonValue::Bool(b),
            CellValue::Number(n) => JsonValue::Number(n),
            CellValue::Text(s) => JsonValue::String(s),
            CellValue::Structured(v) => v,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::int(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cell(self))
    }
}

/// Canonical display/edit text for a cell value.
pub fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => "NULL".to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Text(s) => s.clone(),
        // `Display` on a JSON value is the compact serialization.
        CellValue::Structured(v) => v.to_string(),
    }
}
