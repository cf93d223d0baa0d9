//! Review shape.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::document::{self, Document};
use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;
use crate::validate::Validate;

/// When a review was written: an epoch number or a sortable string
/// (typically RFC 3339).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewTime {
    Number(Number),
    Text(String),
}

/// A room review. `room_id` correlates loosely with a room's `_id` and is
/// never checked against the rooms collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", default)]
    pub id: DocumentId,
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub time: ReviewTime,
    #[serde(flatten)]
    pub details: Document,
}

impl Review {
    pub const ROOM_ID_FIELD: &'static str = "roomId";
    pub const TIME_FIELD: &'static str = "time";

    pub fn to_document(&self) -> DomainResult<Document> {
        document::to_document(self)
    }
}

impl Validate for Review {
    fn validate(&self) -> DomainResult<()> {
        if self.room_id.trim().is_empty() {
            return Err(DomainError::validation("roomId must not be empty"));
        }
        if let ReviewTime::Text(t) = &self.time {
            if t.trim().is_empty() {
                return Err(DomainError::validation("time must not be empty"));
            }
        }
        Ok(())
    }
}
