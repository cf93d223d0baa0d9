//! Booking shape.

use serde::{Deserialize, Serialize};

use crate::document::{self, Document};
use crate::email::Email;
use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;
use crate::validate::Validate;

/// A booking owned by `email`.
///
/// Any fields beyond the required ones are stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", default)]
    pub id: DocumentId,
    pub email: Email,
    pub date: String,
    #[serde(flatten)]
    pub details: Document,
}

impl Booking {
    pub const EMAIL_FIELD: &'static str = "email";
    pub const DATE_FIELD: &'static str = "date";

    pub fn to_document(&self) -> DomainResult<Document> {
        document::to_document(self)
    }

    /// Owner of a stored booking document, without requiring the whole
    /// document to match the current shape.
    pub fn owner_of(doc: &Document) -> Option<&str> {
        doc.get(Self::EMAIL_FIELD).and_then(|v| v.as_str())
    }
}

impl Validate for Booking {
    fn validate(&self) -> DomainResult<()> {
        if self.date.trim().is_empty() {
            return Err(DomainError::validation("date must not be empty"));
        }
        Ok(())
    }
}
