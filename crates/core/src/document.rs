//! Schemaless documents and conversion from the typed shapes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// Serialize a typed shape into a document.
pub fn to_document<T: Serialize>(value: &T) -> DomainResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DomainError::validation(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(DomainError::validation(e.to_string())),
    }
}

/// Read the `_id` of a document, if it has one.
pub fn id_of(doc: &Document) -> DomainResult<Option<DocumentId>> {
    match doc.get(ID_FIELD) {
        None => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(other) => Err(DomainError::invalid_id(format!(
            "_id must be a string, got {other}"
        ))),
    }
}
