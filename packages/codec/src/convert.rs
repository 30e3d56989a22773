//! Conversions between `Value`, `serde_json::Value`, and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::{Scalar, Value};

/// Encode any serializable type as a [`Value`], ready for [`flatten`].
///
/// `None`/unit fields become `Absent` and are left out of mappings, so they
/// take no column.
///
/// [`flatten`]: crate::flatten
pub fn to_value<T: Serialize>(data: &T) -> Result<Value> {
    serde_json::to_value(data)
        .map(Value::from)
        .map_err(conversion_error)
}

/// Decode a [`Value`] read back from a table into a typed record.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value.into()).map_err(conversion_error)
}

pub fn from_json(json: serde_json::Value) -> Value {
    json.into()
}

pub fn to_json(value: Value) -> serde_json::Value {
    value.into()
}

fn conversion_error(e: serde_json::Error) -> Error {
    Error::Conversion {
        message: e.to_string(),
    }
}

impl From<&serde_json::Number> for Scalar {
    fn from(n: &serde_json::Number) -> Self {
        match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Scalar::Integer(i),
            (None, Some(f)) => Scalar::Float(f),
            (None, None) => Scalar::String(n.to_string()),
        }
    }
}

/// JSON `null` is `Absent`; `null` members are dropped from mappings.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Absent,
            Json::Bool(b) => Scalar::Bool(b).into(),
            Json::Number(n) => Scalar::from(&n).into(),
            Json::String(s) => Scalar::String(s).into(),
            Json::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Json::Object(members) => Value::Mapping(
                members
                    .into_iter()
                    .filter(|(_, member)| !member.is_null())
                    .map(|(name, member)| (name, member.into()))
                    .collect(),
            ),
        }
    }
}

impl From<Scalar> for serde_json::Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => b.into(),
            Scalar::Integer(i) => i.into(),
            // NaN and infinities have no JSON form
            Scalar::Float(f) => serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number),
            Scalar::String(s) => s.into(),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Absent => Self::Null,
            Value::Scalar(scalar) => scalar.into(),
            Value::Sequence(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Mapping(members) => Self::Object(
                members
                    .into_iter()
                    .map(|(name, member)| (name, member.into()))
                    .collect(),
            ),
        }
    }
}
