//! The Value type - a structured value that can be stored as a table row.
//!
//! A `Value` is a tree of mappings and sequences whose leaves are `Scalar`s.
//! Only scalars ever reach a table cell; the tree shape is encoded in the
//! column paths (see [`crate::flatten`]).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::Path;

/// A single cell value.
///
/// `Scalar::String("")` doubles as the "no field here" sentinel in both flat
/// records and rows, so an empty string can never be persisted as data.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// The empty-string sentinel.
    pub fn empty() -> Self {
        Scalar::String(String::new())
    }

    /// Check if this scalar is the empty-string sentinel.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Scalar::String(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::empty()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A structured value that can be written to or read from a table.
///
/// # Design Notes
///
/// - `Mapping` uses `BTreeMap`: member order carries no meaning, and a sorted
///   map keeps comparisons and flattening deterministic.
/// - `Sequence` may contain `Absent` entries. These are the holes of a sparse
///   sequence and round-trip as holes.
/// - A `Mapping` should not hold `Absent` members; the encoder omits them.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value at all. Never written to a cell.
    #[default]
    Absent,
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Create an empty mapping.
    pub fn mapping() -> Self {
        Value::Mapping(BTreeMap::new())
    }

    /// Create an empty sequence.
    pub fn sequence() -> Self {
        Value::Sequence(Vec::new())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get a nested value by path.
    ///
    /// Returns `None` if the path doesn't exist, can't be navigated, or ends
    /// on a hole of a sparse sequence.
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for segment in path.iter() {
            current = match current {
                Value::Mapping(map) => map.get(segment)?,
                Value::Sequence(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?
                }
                _ => return None,
            };
        }
        if current.is_absent() {
            None
        } else {
            Some(current)
        }
    }

    /// Look up a direct member of a mapping.
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.as_mapping()?.get(name)
    }

    /// Insert a member into a mapping, turning `Absent` into a mapping first.
    ///
    /// Inserting `Absent` removes the member instead. Returns `false` when
    /// `self` is neither a mapping nor absent.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        if self.is_absent() {
            *self = Value::mapping();
        }
        match self {
            Value::Mapping(map) => {
                let name = name.into();
                match value.into() {
                    Value::Absent => {
                        map.remove(&name);
                    }
                    value => {
                        map.insert(name, value);
                    }
                }
                true
            }
            _ => false,
        }
    }
}

// Conversions from common types

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Integer(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

/// Timestamps become UTC RFC 3339 strings with millisecond precision, so the
/// stored text doesn't depend on the writer's locale or timezone.
impl<Tz: TimeZone> From<DateTime<Tz>> for Scalar {
    fn from(v: DateTime<Tz>) -> Self {
        Scalar::String(
            v.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }
}

macro_rules! value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

value_from_scalar!(bool, i64, i32, f64, String, &str);

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::Scalar(Scalar::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Absent)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut value = Value::mapping();
        for (k, v) in iter {
            value.insert(k, v);
        }
        value
    }
}
