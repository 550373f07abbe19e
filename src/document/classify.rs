//! Meaningful value classification
//!
//! Decides whether a value is worth recording in an audit trail. Arrays are
//! atomic: present means meaningful, contents are never inspected. Objects
//! are recursive: meaningful only if some nested leaf is.

use serde_json::Value;

/// Default nesting limit for classification and diffing
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Check whether a value is meaningful, using the default depth limit
pub fn is_meaningful(value: Option<&Value>) -> bool {
    is_meaningful_within(value, DEFAULT_MAX_DEPTH)
}

/// Check whether a value is meaningful, descending at most `depth` object levels
///
/// Once the limit is reached a non-empty object is taken as meaningful.
pub fn is_meaningful_within(value: Option<&Value>, depth: usize) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) => true,
        Some(Value::Object(map)) => {
            if map.is_empty() {
                return false;
            }
            if depth == 0 {
                return true;
            }
            map.values()
                .any(|v| is_meaningful_within(Some(v), depth - 1))
        }
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_null_and_empty_string() {
        assert!(!is_meaningful(None));
        assert!(!is_meaningful(Some(&json!(null))));
        assert!(!is_meaningful(Some(&json!(""))));
    }

    #[test]
    fn test_scalars() {
        assert!(is_meaningful(Some(&json!("x"))));
        assert!(is_meaningful(Some(&json!(0))));
        assert!(is_meaningful(Some(&json!(false))));
        assert!(is_meaningful(Some(&json!(" "))));
    }

    #[test]
    fn test_arrays_are_atomic() {
        assert!(is_meaningful(Some(&json!([]))));
        assert!(is_meaningful(Some(&json!([null, ""]))));
    }

    #[test]
    fn test_objects_recurse() {
        assert!(!is_meaningful(Some(&json!({}))));
        assert!(!is_meaningful(Some(&json!({"a": null, "b": ""}))));
        assert!(!is_meaningful(Some(&json!({"a": {"b": {"c": null}}}))));
        assert!(is_meaningful(Some(&json!({"a": null, "b": "x"}))));
        assert!(is_meaningful(Some(&json!({"a": {"b": {"c": 1}}}))));
        assert!(is_meaningful(Some(&json!({"tags": []}))));
    }

    #[test]
    fn test_depth_limit() {
        let deep = json!({"a": {"b": {"c": null}}});
        assert!(!is_meaningful_within(Some(&deep), 3));
        assert!(is_meaningful_within(Some(&deep), 1));
    }
}
