//! Field-level diff generation
//!
//! Walks two optional document trees and yields one [`FieldChange`] per leaf
//! field whose meaningful value differs. Nested plain objects are flattened
//! into dot-delimited paths; arrays and scalars are compared as whole leaves.
//!
//! When only one side of a field is an object, that object is expanded on its
//! own: every meaningful sub-field is reported as added (object on the new
//! side) or removed (object on the old side).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::display::format_value;
use crate::document::{
    as_plain_object, documents_equal, is_meaningful_within, optional_values_equal, Document,
    DEFAULT_MAX_DEPTH,
};

/// Top-level fields never audited unless configured otherwise
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 3] = ["_id", "__v", "updatedAt"];

/// Owned copy of [`DEFAULT_EXCLUDED_FIELDS`]
pub fn default_excluded_fields() -> Vec<String> {
    DEFAULT_EXCLUDED_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// A single changed leaf field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Dot-delimited path to the leaf (e.g. `Address.City`)
    pub path: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl FieldChange {
    fn new(path: String, old_value: Option<&Value>, new_value: Option<&Value>) -> Self {
        Self {
            path,
            old_value: old_value.cloned().unwrap_or(Value::Null),
            new_value: new_value.cloned().unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.path,
            format_value(&self.old_value),
            format_value(&self.new_value)
        )
    }
}

/// Diff two optional documents
///
/// `excluded` applies to top-level keys only; nested fields are always
/// compared. The returned iterator is lazy and single-pass.
pub fn diff<'a>(
    old: Option<&'a Document>,
    new: Option<&'a Document>,
    prefix: &str,
    excluded: &'a [String],
) -> DiffIter<'a> {
    DiffIter {
        stack: vec![Frame::Compare(CompareFrame::new(prefix.to_string(), old, new, 0))],
        excluded,
        max_depth: DEFAULT_MAX_DEPTH,
    }
}

/// Which side of the diff a one-sided expansion reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Old,
    New,
}

struct CompareFrame<'a> {
    prefix: String,
    old: Option<&'a Document>,
    new: Option<&'a Document>,
    keys: std::vec::IntoIter<&'a String>,
    depth: usize,
}

impl<'a> CompareFrame<'a> {
    fn new(
        prefix: String,
        old: Option<&'a Document>,
        new: Option<&'a Document>,
        depth: usize,
    ) -> Self {
        // Old keys in document order, then keys only present in the new side
        let mut keys: Vec<&'a String> = old.map(|m| m.keys().collect()).unwrap_or_default();
        if let Some(new) = new {
            keys.extend(
                new.keys()
                    .filter(|k| !old.is_some_and(|old| old.contains_key(k.as_str()))),
            );
        }

        Self {
            prefix,
            old,
            new,
            keys: keys.into_iter(),
            depth,
        }
    }
}

struct ExpandFrame<'a> {
    prefix: String,
    fields: serde_json::map::Iter<'a>,
    side: Side,
    depth: usize,
}

enum Frame<'a> {
    Compare(CompareFrame<'a>),
    Expand(ExpandFrame<'a>),
}

enum Step<'a> {
    Pop,
    Push(Frame<'a>),
    Emit(FieldChange),
    Skip,
}

/// Lazy iterator over the leaf changes between two documents
pub struct DiffIter<'a> {
    stack: Vec<Frame<'a>>,
    excluded: &'a [String],
    max_depth: usize,
}

impl<'a> DiffIter<'a> {
    /// Limit how many object levels are descended before objects are
    /// compared as whole leaves
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn compare_step<'a>(
    frame: &mut CompareFrame<'a>,
    excluded: &[String],
    max_depth: usize,
) -> Step<'a> {
    let Some(key) = frame.keys.next() else {
        return Step::Pop;
    };

    if frame.depth == 0 && excluded.iter().any(|f| f == key) {
        return Step::Skip;
    }

    let old = frame.old.and_then(|m| m.get(key.as_str()));
    let new = frame.new.and_then(|m| m.get(key.as_str()));
    let path = join_path(&frame.prefix, key);
    let depth = frame.depth + 1;

    if frame.depth < max_depth {
        match (as_plain_object(old), as_plain_object(new)) {
            (Some(old_obj), Some(new_obj)) => {
                if documents_equal(old_obj, new_obj) {
                    return Step::Skip;
                }
                return Step::Push(Frame::Compare(CompareFrame::new(
                    path,
                    Some(old_obj),
                    Some(new_obj),
                    depth,
                )));
            }
            (Some(old_obj), None) => {
                return Step::Push(Frame::Expand(ExpandFrame {
                    prefix: path,
                    fields: old_obj.iter(),
                    side: Side::Old,
                    depth,
                }));
            }
            (None, Some(new_obj)) => {
                return Step::Push(Frame::Expand(ExpandFrame {
                    prefix: path,
                    fields: new_obj.iter(),
                    side: Side::New,
                    depth,
                }));
            }
            (None, None) => {}
        }
    }

    if optional_values_equal(old, new) {
        return Step::Skip;
    }

    // absent / null / "" on both sides is not a change
    let remaining = max_depth.saturating_sub(frame.depth);
    if !is_meaningful_within(old, remaining) && !is_meaningful_within(new, remaining) {
        return Step::Skip;
    }

    Step::Emit(FieldChange::new(path, old, new))
}

fn expand_step<'a>(frame: &mut ExpandFrame<'a>, max_depth: usize) -> Step<'a> {
    let Some((key, value)) = frame.fields.next() else {
        return Step::Pop;
    };

    let path = join_path(&frame.prefix, key);

    if frame.depth < max_depth {
        if let Value::Object(child) = value {
            return Step::Push(Frame::Expand(ExpandFrame {
                prefix: path,
                fields: child.iter(),
                side: frame.side,
                depth: frame.depth + 1,
            }));
        }
    }

    if !is_meaningful_within(Some(value), max_depth.saturating_sub(frame.depth)) {
        return Step::Skip;
    }

    match frame.side {
        Side::Old => Step::Emit(FieldChange::new(path, Some(value), None)),
        Side::New => Step::Emit(FieldChange::new(path, None, Some(value))),
    }
}

impl<'a> Iterator for DiffIter<'a> {
    type Item = FieldChange;

    fn next(&mut self) -> Option<Self::Item> {
        let excluded = self.excluded;
        let max_depth = self.max_depth;

        loop {
            let step = match self.stack.last_mut()? {
                Frame::Compare(frame) => compare_step(frame, excluded, max_depth),
                Frame::Expand(frame) => expand_step(frame, max_depth),
            };

            match step {
                Step::Pop => {
                    self.stack.pop();
                }
                Step::Push(frame) => self.stack.push(frame),
                Step::Emit(change) => return Some(change),
                Step::Skip => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn changes(old: Option<&Document>, new: Option<&Document>) -> Vec<FieldChange> {
        let excluded = default_excluded_fields();
        diff(old, new, "", &excluded).collect()
    }

    fn change(path: &str, old: Value, new: Value) -> FieldChange {
        FieldChange {
            path: path.to_string(),
            old_value: old,
            new_value: new,
        }
    }

    #[test]
    fn test_identical_documents() {
        let d = doc(json!({
            "name": "Ann",
            "tags": ["a", "b"],
            "Address": {"City": "Lyon", "Geo": {"lat": 45.7}},
            "note": null
        }));
        assert!(changes(Some(&d), Some(&d)).is_empty());
    }

    #[test]
    fn test_simple_field_change() {
        let old = doc(json!({"role": "user", "name": "Ann"}));
        let new = doc(json!({"role": "admin", "name": "Ann"}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("role", json!("user"), json!("admin"))]
        );
    }

    #[test]
    fn test_nested_path() {
        let old = doc(json!({"Address": {"City": "A", "State": "X"}}));
        let new = doc(json!({"Address": {"City": "B", "State": "X"}}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("Address.City", json!("A"), json!("B"))]
        );
    }

    #[test]
    fn test_insert_expands_meaningful_leaves() {
        let new = doc(json!({
            "_id": "u1",
            "name": "Ann",
            "email": "a@x.com",
            "nickname": "",
            "phone": null,
            "Address": {"City": "Lyon", "Zip": ""}
        }));

        assert_eq!(
            changes(None, Some(&new)),
            vec![
                change("name", Value::Null, json!("Ann")),
                change("email", Value::Null, json!("a@x.com")),
                change("Address.City", Value::Null, json!("Lyon")),
            ]
        );
    }

    #[test]
    fn test_delete_expands_meaningful_leaves() {
        let old = doc(json!({"email": "a@x.com", "Address": {"City": "Lyon"}, "n": 0}));

        assert_eq!(
            changes(Some(&old), None),
            vec![
                change("email", json!("a@x.com"), Value::Null),
                change("Address.City", json!("Lyon"), Value::Null),
                change("n", json!(0), Value::Null),
            ]
        );
    }

    #[test]
    fn test_excluded_fields_top_level_only() {
        let old = doc(json!({"_id": 1, "updatedAt": "t1", "__v": 0, "meta": {"_id": "a"}}));
        let new = doc(json!({"_id": 2, "updatedAt": "t2", "__v": 1, "meta": {"_id": "b"}}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("meta._id", json!("a"), json!("b"))]
        );
    }

    #[test]
    fn test_object_replaced_by_scalar() {
        let old = doc(json!({"Address": {"City": "Lyon", "Zip": null}}));
        let new = doc(json!({"Address": null}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("Address.City", json!("Lyon"), Value::Null)]
        );
    }

    #[test]
    fn test_scalar_replaced_by_object() {
        let old = doc(json!({"Address": "unknown"}));
        let new = doc(json!({"Address": {"City": "Lyon"}}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("Address.City", Value::Null, json!("Lyon"))]
        );
    }

    #[test]
    fn test_arrays_are_leaves() {
        let old = doc(json!({"tags": [{"k": 1}], "empty": []}));
        let new = doc(json!({"tags": [{"k": 2}], "empty": []}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("tags", json!([{"k": 1}]), json!([{"k": 2}]))]
        );
    }

    #[test]
    fn test_empty_transitions() {
        let old = doc(json!({"a": "x", "b": null, "d": ""}));
        let new = doc(json!({"a": "", "b": "", "c": null}));

        // "x" -> "" is logged; null -> "", absent -> null and "" -> absent are not
        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![change("a", json!("x"), json!(""))]
        );
    }

    #[test]
    fn test_number_representation_is_not_a_change() {
        let old = doc(json!({"qty": 1}));
        let new = doc(json!({"qty": 1.0}));
        assert!(changes(Some(&old), Some(&new)).is_empty());
    }

    #[test]
    fn test_added_and_removed_fields() {
        let old = doc(json!({"a": 1, "b": 2}));
        let new = doc(json!({"b": 2, "c": 3}));

        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![
                change("a", json!(1), Value::Null),
                change("c", Value::Null, json!(3)),
            ]
        );
    }

    #[test]
    fn test_prefix_is_applied() {
        let old = doc(json!({"x": 1}));
        let new = doc(json!({"x": 2}));
        let excluded = Vec::new();

        let result: Vec<_> = diff(Some(&old), Some(&new), "root", &excluded).collect();
        assert_eq!(result, vec![change("root.x", json!(1), json!(2))]);
    }

    #[test]
    fn test_max_depth_compares_objects_whole() {
        let old = doc(json!({"a": {"b": {"c": 1}}}));
        let new = doc(json!({"a": {"b": {"c": 2}}}));
        let excluded = Vec::new();

        let result: Vec<_> = diff(Some(&old), Some(&new), "", &excluded)
            .with_max_depth(1)
            .collect();
        assert_eq!(
            result,
            vec![change("a.b", json!({"c": 1}), json!({"c": 2}))]
        );
    }

    #[test]
    fn test_iterator_is_lazy() {
        let old = doc(json!({"a": 1, "b": 1, "c": 1}));
        let new = doc(json!({"a": 2, "b": 2, "c": 2}));
        let excluded = Vec::new();

        let mut iter = diff(Some(&old), Some(&new), "", &excluded);
        assert_eq!(iter.next().map(|c| c.path), Some("a".to_string()));
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn test_dotted_key_shares_path_with_nested_field() {
        let old = doc(json!({"a.b": 1, "a": {"b": 1}}));
        let new = doc(json!({"a.b": 2, "a": {"b": 2}}));

        // keys are joined verbatim, so both leaves report the same path
        assert_eq!(
            changes(Some(&old), Some(&new)),
            vec![
                change("a.b", json!(1), json!(2)),
                change("a.b", json!(1), json!(2)),
            ]
        );
    }

    #[test]
    fn test_display() {
        let c = change("Address.City", json!("A"), json!("B"));
        assert_eq!(c.to_string(), "Address.City: \"A\" -> \"B\"");
    }
}
