//! Document representation and serialization helpers.
//!
//! A stored document is an arbitrary nested key-value structure addressed by an
//! opaque string identifier. Documents are represented as JSON objects
//! ([`Doc`]); typed access is available through serde conversion helpers.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value, to_value};
use uuid::Uuid;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A stored document body: a JSON object mapping string keys to values.
///
/// An empty document always encodes as the empty JSON object `{}`, never as an
/// array.
pub type Doc = Map<String, Value>;

/// Name of the reserved sub-object holding promoted metadata fields.
pub const METADATA_KEY: &str = "metadata";

/// Generates a fresh opaque document identifier (a UUID v4 string).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Converts a serializable value into a document body.
///
/// # Errors
///
/// Returns a serialization error if the value does not serialize to a JSON
/// object.
pub fn to_doc<T: Serialize>(value: &T) -> DocumentStoreResult<Doc> {
    match to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DocumentStoreError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Converts a document body into a deserializable value.
///
/// # Errors
///
/// Returns a serialization error if deserialization fails.
pub fn from_doc<T: DeserializeOwned>(doc: Doc) -> DocumentStoreResult<T> {
    Ok(from_value(Value::Object(doc))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Character {
        name: String,
        age: u32,
    }

    #[test]
    fn doc_round_trip() {
        let tiger = Character { name: "Tiger".to_string(), age: 5 };
        let doc = to_doc(&tiger).unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Tiger")));

        let back: Character = from_doc(doc).unwrap();
        assert_eq!(back, tiger);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(matches!(
            to_doc(&42),
            Err(DocumentStoreError::Serialization(_))
        ));
    }

    #[test]
    fn empty_doc_is_an_object() {
        let doc = Doc::new();
        assert_eq!(serde_json::to_string(&doc).unwrap(), "{}");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
