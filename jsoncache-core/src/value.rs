//! The recursive value model shared by every component of the store.
//!
//! [`Value`] is a tagged union over everything a JSON payload can carry. Numbers are kept
//! as `f64`, so `30` and `30.0` are the same value once stored. Objects use a sorted map;
//! key order never affects equality.

use std::collections::BTreeMap;

use bson::{Bson, Document as BsonDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// String-keyed object body of a [`Value::Object`].
pub type Map = BTreeMap<String, Value>;

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A JSON-like datum.
///
/// Serializes as plain JSON (no variant tags); the binary codec carries its own
/// type tags, see [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`.
    #[default]
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// Any number, integral or not.
    Number(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered, possibly heterogeneous list.
    Array(Vec<Value>),
    /// String-keyed object.
    Object(Map),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Parses a JSON text into a value.
    pub fn from_json_str(input: &str) -> DocumentStoreResult<Value> {
        Ok(serde_json::from_str(input)?)
    }

    /// Converts a value that must be an object into its map.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`] for any other variant.
    pub fn into_object(self) -> DocumentStoreResult<Map> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "expected an object, found {}",
                other.type_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect()
        )
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Bool(value),
            JsonValue::Number(number) => number
                .as_f64()
                .map_or(Value::Null, Value::Number),
            JsonValue::String(value) => Value::String(value),
            JsonValue::Array(values) => Value::Array(
                values
                    .into_iter()
                    .map(Value::from)
                    .collect()
            ),
            JsonValue::Object(map) => Value::Object(
                map
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect()
            ),
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(value) => JsonValue::Bool(value),
            // Integral numbers render without a fractional part.
            Value::Number(number) if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER => {
                JsonValue::from(number as i64)
            }
            // JSON has no representation for NaN or infinities.
            Value::Number(number) => serde_json::Number::from_f64(number)
                .map_or(JsonValue::Null, JsonValue::Number),
            Value::String(value) => JsonValue::String(value),
            Value::Array(values) => JsonValue::Array(
                values
                    .into_iter()
                    .map(JsonValue::from)
                    .collect()
            ),
            Value::Object(map) => JsonValue::Object(
                map
                    .into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect()
            ),
        }
    }
}

/// Object keys become BSON element names, which cannot hold U+0000. The store file uses
/// its own pair encoding, see [`crate::codec`].
impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Bson::Null,
            Value::Bool(value) => Bson::Boolean(value),
            Value::Number(number) => Bson::Double(number),
            Value::String(value) => Bson::String(value),
            Value::Array(values) => Bson::Array(
                values
                    .into_iter()
                    .map(Bson::from)
                    .collect()
            ),
            Value::Object(map) => Bson::Document(
                map
                    .into_iter()
                    .map(|(key, value)| (key, Bson::from(value)))
                    .collect::<BsonDocument>()
            ),
        }
    }
}

impl TryFrom<Bson> for Value {
    type Error = DocumentStoreError;

    fn try_from(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(match bson {
            Bson::Null => Value::Null,
            Bson::Boolean(value) => Value::Bool(value),
            Bson::Double(number) => Value::Number(number),
            Bson::Int32(number) => Value::Number(number as f64),
            Bson::Int64(number) => Value::Number(number as f64),
            Bson::String(value) => Value::String(value),
            Bson::Array(values) => Value::Array(
                values
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<DocumentStoreResult<Vec<_>>>()?
            ),
            Bson::Document(doc) => Value::Object(
                doc
                    .into_iter()
                    .map(|(key, value)| Ok((key, Value::try_from(value)?)))
                    .collect::<DocumentStoreResult<Map>>()?
            ),
            other => {
                return Err(DocumentStoreError::Serialization(format!(
                    "unsupported BSON element type {:?}",
                    other.element_type()
                )));
            }
        })
    }
}
