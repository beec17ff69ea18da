//! Document identifiers and typed document conversions.
//!
//! The store itself only ever sees [`Value`]s. This module bridges user-defined serde types
//! to that representation so callers can keep working with their own structs.

use serde::{Serialize, de::DeserializeOwned};

use crate::{error::DocumentStoreResult, value::Value};

/// Opaque identifier a document is stored under.
///
/// The store never inspects or validates identifiers; they are plain map keys.
pub type DocumentId = String;

/// Generates a fresh, globally unique document identifier (a hyphenated UUID v4).
pub fn new_document_id() -> DocumentId {
    uuid::Uuid::new_v4().to_string()
}

/// Extension trait providing conversions between serde types and [`Value`].
///
/// Automatically implemented for every type that is both `Serialize` and `DeserializeOwned`.
///
/// # Example
///
/// ```ignore
/// use jsoncache_core::document::DocumentExt;
///
/// #[derive(Serialize, Deserialize)]
/// struct User { name: String, age: u32 }
///
/// let value = User { name: "Alice".into(), age: 30 }.to_value()?;
/// let user = User::from_value(value)?;
/// ```
pub trait DocumentExt: Sized {
    /// Converts this document to a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_value(&self) -> DocumentStoreResult<Value>;

    /// Creates a document from a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the shape of `Self`.
    fn from_value(value: Value) -> DocumentStoreResult<Self>;
}

impl<D: Serialize + DeserializeOwned> DocumentExt for D {
    fn to_value(&self) -> DocumentStoreResult<Value> {
        Ok(Value::from(serde_json::to_value(self)?))
    }

    fn from_value(value: Value) -> DocumentStoreResult<Self> {
        Ok(serde_json::from_value(serde_json::Value::from(value))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Employee {
        name: String,
        age: u32,
        items: Vec<String>,
    }

    #[test]
    fn typed_documents_convert_through_values() {
        let frank = Employee {
            name: "frank".into(),
            age: 41,
            items: vec!["music".into(), "sport".into()],
        };

        let value = frank.to_value().unwrap();
        assert_eq!(value.get("age"), Some(&Value::Number(41.0)));

        let back = Employee::from_value(value).unwrap();
        assert_eq!(back, frank);
    }

    #[test]
    fn shape_mismatch_is_a_serialization_error() {
        let err = Employee::from_value(Value::from("nope")).unwrap_err();
        assert!(matches!(err, crate::error::DocumentStoreError::Serialization(_)));
    }

    #[test]
    fn generated_ids_are_unique_uuids() {
        let a = new_document_id();
        let b = new_document_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
