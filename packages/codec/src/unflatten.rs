//! Unflatten Decoder: flat key/scalar record -> `Value`.
//!
//! The record keys are first folded into a trie keyed by path segment. The
//! children of a trie node are exactly the sibling segments that share that
//! node's prefix, which is what the sequence-vs-mapping decision looks at.
//!
//! A mapping whose member names are all decimal integers is decoded as a
//! sequence. The flat format carries no other shape information, so this is
//! an accepted limitation of the format rather than something decoding can
//! fix.
//!
//! Only canonical indices count: `"0"` and `"12"` do, `"01"`, `"+1"` and
//! `"1a"` do not, and a node with any such child is a mapping.
//!
//! A node is also kept as a mapping when its indices are too sparse to
//! materialize: the sequence would need more than [`SEQUENCE_SPAN_FLOOR`]
//! slots and more than [`SEQUENCE_SPAN_PER_ITEM`] slots per present index.
//! Maps keyed by large numeric ids therefore decode as mappings.

use std::collections::BTreeMap;

use crate::flatten::FlatRecord;
use crate::{Path, Scalar, Value};

/// Rebuild a structured value from a flat record.
///
/// Sentinel entries are treated as absent. An empty record decodes to an
/// empty mapping.
///
/// # Examples
///
/// ```rust
/// use structsheet_codec::{unflatten, FlatRecord, Scalar, Value};
///
/// let mut record = FlatRecord::new();
/// record.insert("times.0".to_string(), Scalar::from("12:41"));
/// record.insert("times.1".to_string(), Scalar::from("2:25"));
///
/// let value = unflatten(&record);
/// assert!(value.member("times").unwrap().is_sequence());
/// ```
pub fn unflatten(record: &FlatRecord) -> Value {
    let mut root = SegmentTrie::default();
    for (key, scalar) in record {
        if scalar.is_sentinel() {
            continue;
        }
        root.insert(&Path::from_key(key), scalar.clone());
    }

    if root.is_empty() {
        return Value::mapping();
    }
    root.into_value()
}

/// Index spans up to this length always decode as sequences.
pub const SEQUENCE_SPAN_FLOOR: usize = 64;

/// Beyond the floor, a sequence may hold at most this many slots per
/// present index.
pub const SEQUENCE_SPAN_PER_ITEM: usize = 16;

/// Check if a segment is a canonical decimal index (`"0"`, `"12"`, not `"01"`).
pub fn is_index_segment(segment: &str) -> bool {
    match segment.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit) && segment.parse::<usize>().is_ok(),
    }
}

#[derive(Debug, Default)]
struct SegmentTrie {
    leaf: Option<Scalar>,
    children: BTreeMap<String, SegmentTrie>,
}

impl SegmentTrie {
    fn is_empty(&self) -> bool {
        self.leaf.is_none() && self.children.is_empty()
    }

    fn insert(&mut self, path: &Path, scalar: Scalar) {
        let mut current = self;
        for segment in path.iter() {
            current = current.children.entry(segment.clone()).or_default();
        }
        current.leaf = Some(scalar);
    }

    /// Length of the sequence this node decodes to, or `None` for a mapping.
    ///
    /// Every child segment must be an index, and the span from 0 to the
    /// largest index must stay within the sparseness bound.
    fn sequence_len(&self) -> Option<usize> {
        let mut largest = 0;
        for segment in self.children.keys() {
            if !is_index_segment(segment) {
                return None;
            }
            largest = largest.max(segment.parse::<usize>().ok()?);
        }
        let len = largest.checked_add(1)?;
        let bound = SEQUENCE_SPAN_FLOOR
            .max(self.children.len().saturating_mul(SEQUENCE_SPAN_PER_ITEM));
        (len <= bound).then_some(len)
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return self.leaf.map(Value::Scalar).unwrap_or(Value::Absent);
        }

        if let Some(leaf) = &self.leaf {
            tracing::debug!(%leaf, "key is also a prefix of other keys; keeping the container");
        }

        if let Some(len) = self.sequence_len() {
            let mut items = vec![Value::Absent; len];
            for (segment, child) in self.children {
                if let Some(slot) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    *slot = child.into_value();
                }
            }
            Value::Sequence(items)
        } else {
            let members = self
                .children
                .into_iter()
                .map(|(segment, child)| (segment, child.into_value()))
                .filter(|(_, value)| !value.is_absent())
                .collect();
            Value::Mapping(members)
        }
    }
}
