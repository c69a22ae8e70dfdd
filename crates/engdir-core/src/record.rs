//! Raw detail record as returned by the registry's member-info endpoint.
//!
//! Nothing about the payload is guaranteed: any key may be missing, null,
//! a string, a number or a list. The accessors never fail; absent values
//! come back as `""` or an empty list.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetailRecord {
    fields: Map<String, Value>,
}

impl RawDetailRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// `Some` when `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Scalar field as text. Absent or null -> `""`.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(value_to_text).unwrap_or_default()
    }

    /// List field as strings with null and empty entries dropped, order kept.
    /// A bare scalar counts as a one-element list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(value_to_text)
                .filter(|s| !s.is_empty())
                .collect(),
            Some(other) => {
                let s = value_to_text(other);
                if s.is_empty() {
                    Vec::new()
                } else {
                    vec![s]
                }
            }
        }
    }

    /// `list(key)` joined with `", "`.
    pub fn joined(&self, key: &str) -> String {
        self.list(key).join(", ")
    }
}

/// Render one JSON value as the text that goes into a cell.
/// Booleans and numbers use their JSON spelling; nested containers stay compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
