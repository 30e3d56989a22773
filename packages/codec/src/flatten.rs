//! Flatten Encoder: `Value` -> flat key/scalar record.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DropReason, Error};
use crate::header::HeaderSet;
use crate::{Path, Scalar, Value};

/// One structured value as cell data: joined path key -> scalar.
///
/// Never holds the empty-string sentinel.
pub type FlatRecord = BTreeMap<String, Scalar>;

/// Flatten a value into a record keyed by joined paths.
///
/// Members that cannot be stored are left out; each is logged at debug
/// level. Use [`flatten_with_diagnostics`] to inspect them.
///
/// # Examples
///
/// ```rust
/// use structsheet_codec::{flatten, Value};
///
/// let value: Value = [("3.1", Value::from(31))].into_iter().collect();
/// let record = flatten(&value);
/// assert!(record.contains_key("3/.1"));
/// ```
pub fn flatten(value: &Value) -> FlatRecord {
    let (record, dropped) = flatten_with_diagnostics(value);
    for diagnostic in &dropped {
        tracing::debug!(%diagnostic, "flatten dropped member");
    }
    record
}

/// Flatten a value and report every member that was dropped.
///
/// Each diagnostic is an [`Error::UnrepresentableValueDropped`]. None of them
/// is fatal; the record holds everything that could be stored. A scalar equal
/// to the sentinel is silently skipped and is not reported.
pub fn flatten_with_diagnostics(value: &Value) -> (FlatRecord, Vec<Error>) {
    let mut flattener = Flattener::default();
    let mut path = Path::root();
    flattener.visit(value, &mut path);
    (flattener.record, flattener.dropped)
}

/// Union of the flattened keys of every value, deduplicated and sorted by
/// byte order.
///
/// Index segments sort as text, so `a.10` comes before `a.2`. Header order is
/// not array order for sequences of ten or more elements.
pub fn get_all_headers<'a>(values: impl IntoIterator<Item = &'a Value>) -> HeaderSet {
    let keys: BTreeSet<String> = values
        .into_iter()
        .flat_map(|value| flatten(value).into_keys())
        .collect();
    HeaderSet::from(keys.into_iter().collect::<Vec<_>>())
}

#[derive(Default)]
struct Flattener {
    record: FlatRecord,
    dropped: Vec<Error>,
}

impl Flattener {
    fn visit(&mut self, value: &Value, path: &mut Path) {
        match value {
            Value::Absent => self.report(path, DropReason::Absent),
            Value::Scalar(Scalar::Float(f)) if !f.is_finite() => {
                self.report(path, DropReason::NonFiniteFloat)
            }
            Value::Scalar(scalar) => {
                if !scalar.is_sentinel() {
                    self.record.insert(path.to_key(), scalar.clone());
                }
            }
            Value::Sequence(items) => {
                if items.is_empty() && !path.is_root() {
                    self.report(path, DropReason::EmptyContainer);
                }
                for (index, item) in items.iter().enumerate() {
                    // Holes of a sparse sequence are simply not written.
                    if item.is_absent() {
                        continue;
                    }
                    path.segments.push(index.to_string());
                    self.visit(item, path);
                    path.segments.pop();
                }
            }
            Value::Mapping(members) => {
                if members.is_empty() && !path.is_root() {
                    self.report(path, DropReason::EmptyContainer);
                }
                for (name, member) in members {
                    path.segments.push(name.clone());
                    if name.is_empty() {
                        self.report(path, DropReason::EmptyName);
                    } else {
                        self.visit(member, path);
                    }
                    path.segments.pop();
                }
            }
        }
    }

    fn report(&mut self, path: &Path, reason: DropReason) {
        self.dropped.push(Error::UnrepresentableValueDropped {
            path: path.to_key(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_json;
    use serde_json::json;

    fn flat(json: serde_json::Value) -> FlatRecord {
        flatten(&from_json(json))
    }

    fn record(json: serde_json::Value) -> FlatRecord {
        match from_json(json) {
            Value::Mapping(map) => map
                .into_iter()
                .map(|(k, v)| match v {
                    Value::Scalar(s) => (k, s),
                    other => panic!("expected scalar, got {:?}", other),
                })
                .collect(),
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn empty_mapping_flattens_to_nothing() {
        assert!(flat(json!({})).is_empty());
    }

    #[test]
    fn top_level_sequence_uses_indices() {
        assert_eq!(
            flat(json!([0, 1, 2, 3])),
            record(json!({"0": 0, "1": 1, "2": 2, "3": 3}))
        );
    }

    #[test]
    fn nested_children() {
        assert_eq!(
            flat(json!({"a": [0, 1, 2, 3], "child": {"a": 12, "b": 14}})),
            record(json!({"a.0": 0, "a.1": 1, "a.2": 2, "a.3": 3, "child.a": 12, "child.b": 14}))
        );
    }

    #[test]
    fn deeply_nested_sequences() {
        assert_eq!(
            flat(json!({"arr": [1, 2, 0], "arr2": {"a": 1, "b": [1, 2, {"a": 1}]}})),
            record(json!({
                "arr.0": 1, "arr.1": 2, "arr.2": 0,
                "arr2.a": 1, "arr2.b.0": 1, "arr2.b.1": 2, "arr2.b.2.a": 1
            }))
        );
    }

    #[test]
    fn ugly_keys_pass_through() {
        assert_eq!(
            flat(json!({"=!@#horrible": 31})),
            record(json!({"=!@#horrible": 31}))
        );
    }

    #[test]
    fn dotted_member_names_are_escaped() {
        assert_eq!(
            flat(json!({"3.1": 31, "2": "ninety"})),
            record(json!({"3/.1": 31, "2": "ninety"}))
        );
        assert_eq!(
            flat(json!({"3.1": 31, "3.2": [1, 2, {"1...1": 1}], "2": "44.1"})),
            record(json!({"3/.1": 31, "3/.2.0": 1, "3/.2.1": 2, "3/.2.2.1/././.1": 1, "2": "44.1"}))
        );
    }

    #[test]
    fn sparse_members_are_trimmed() {
        assert_eq!(
            flat(json!({"a": 1, "c": null, "d": "", "e": {"a": 1, "c": null, "d": "", "e": 0, "f": "0"}})),
            record(json!({"a": 1, "e.a": 1, "e.e": 0, "e.f": "0"}))
        );
    }

    #[test]
    fn sparse_sequence_skips_holes() {
        let value = Value::Mapping(
            [(
                "naughty".to_string(),
                Value::Sequence(vec![Value::Absent, Value::from(2), Value::from("4")]),
            )]
            .into_iter()
            .collect(),
        );
        let (record, dropped) = flatten_with_diagnostics(&value);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["naughty.1", "naughty.2"]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn diagnostics_report_dropped_members() {
        let mut value = Value::mapping();
        value.insert("nan", f64::NAN);
        value.insert("empty", Value::mapping());
        value.insert("", 3);
        value.insert("ok", 1);
        if let Value::Mapping(map) = &mut value {
            map.insert("gone".to_string(), Value::Absent);
        }

        let (record, dropped) = flatten_with_diagnostics(&value);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("ok"), Some(&Scalar::Integer(1)));

        let reasons: Vec<(String, DropReason)> = dropped
            .into_iter()
            .map(|e| match e {
                Error::UnrepresentableValueDropped { path, reason } => (path, reason),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert!(reasons.contains(&("".to_string(), DropReason::EmptyName)));
        assert!(reasons.contains(&("empty".to_string(), DropReason::EmptyContainer)));
        assert!(reasons.contains(&("gone".to_string(), DropReason::Absent)));
        assert!(reasons.contains(&("nan".to_string(), DropReason::NonFiniteFloat)));
    }

    #[test]
    fn sentinel_scalar_is_not_a_diagnostic() {
        let value: Value = [("blank", Value::from(""))].into_iter().collect();
        let (record, dropped) = flatten_with_diagnostics(&value);
        assert!(record.is_empty());
        assert!(dropped.is_empty());
    }

    #[test]
    fn root_scalar_uses_empty_key() {
        let record = flatten(&Value::from(5));
        assert_eq!(record.get(""), Some(&Scalar::Integer(5)));
    }

    #[test]
    fn headers_are_sorted_leaf_paths() {
        let values = vec![from_json(json!({"a": [0, 1, 2, 3], "child": {"a": 12, "b": 14}}))];
        assert_eq!(
            get_all_headers(&values).as_slice(),
            ["a.0", "a.1", "a.2", "a.3", "child.a", "child.b"]
        );
    }

    #[test]
    fn headers_union_across_values() {
        let values = vec![
            from_json(json!({"b": 1, "a": 2})),
            from_json(json!({"c": 1, "a": 3})),
        ];
        assert_eq!(get_all_headers(&values).as_slice(), ["a", "b", "c"]);
        assert!(get_all_headers(&[from_json(json!({}))]).is_empty());
    }

    #[test]
    fn header_order_is_lexicographic_not_numeric() {
        let values = vec![from_json(json!({"a": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]}))];
        let headers = get_all_headers(&values);
        assert_eq!(&headers.as_slice()[..4], ["a.0", "a.1", "a.10", "a.2"]);
    }
}
