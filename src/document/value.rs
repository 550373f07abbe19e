//! Structural helpers over loosely-typed documents
//!
//! Documents are plain `serde_json::Value` trees. Equality is defined here
//! explicitly instead of relying on a serialize-and-compare shortcut, so key
//! order never matters and integers compare equal to their float form.

use serde_json::{Map, Value};

/// A document body: an ordered map of field name to value
pub type Document = Map<String, Value>;

/// Structural equality over document values
///
/// - numbers compare numerically (`1 == 1.0`)
/// - arrays compare element-wise, in order
/// - objects compare by key set and per-key value, ignoring key order
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => documents_equal(x, y),
        _ => false,
    }
}

/// Structural equality over two documents, ignoring key order
pub fn documents_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
}

/// Equality where an absent field is the same as an explicit `null`
pub fn optional_values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    values_equal(a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null))
}

/// Returns the map if the value is a plain object (not an array, not null)
pub fn as_plain_object(value: Option<&Value>) -> Option<&Document> {
    value.and_then(Value::as_object)
}

/// Render a document identifier as a plain string
///
/// Strings are returned as-is, extended-JSON object ids (`{"$oid": "..."}`)
/// yield their hex form, numbers their decimal form. Anything else falls
/// back to compact JSON.
pub fn render_id(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => match map.get("$oid").and_then(Value::as_str) {
            Some(oid) => Some(oid.to_string()),
            None => Some(value.to_string()),
        },
        other => Some(other.to_string()),
    }
}
