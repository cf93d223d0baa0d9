//! Room shape.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::document::{self, Document};
use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;
use crate::validate::Validate;

/// A bookable room.
///
/// Rooms arrive through seed data or directly in the store; the HTTP surface
/// only flips `availability`. Descriptive fields (title, images, ...) are kept
/// verbatim in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "_id", default)]
    pub id: DocumentId,
    pub price_per_night: Number,
    #[serde(default)]
    pub availability: bool,
    #[serde(flatten)]
    pub details: Document,
}

impl Room {
    pub fn to_document(&self) -> DomainResult<Document> {
        document::to_document(self)
    }
}

impl Validate for Room {
    fn validate(&self) -> DomainResult<()> {
        match self.price_per_night.as_f64() {
            Some(p) if p >= 0.0 => Ok(()),
            _ => Err(DomainError::validation(
                "price_per_night must be a non-negative number",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_descriptive_fields() {
        let room: Room = serde_json::from_value(json!({
            "price_per_night": 120,
            "title": "Sea view",
            "images": ["a.jpg"],
        }))
        .unwrap();
        room.validate().unwrap();
        assert!(!room.availability);

        let doc = room.to_document().unwrap();
        assert_eq!(doc["title"], "Sea view");
        assert_eq!(doc["price_per_night"], 120);
        assert_eq!(doc["_id"], json!(room.id.to_string()));
    }

    #[test]
    fn negative_price_is_invalid() {
        let room: Room =
            serde_json::from_value(json!({ "price_per_night": -5 })).unwrap();
        assert!(room.validate().is_err());
    }

    #[test]
    fn price_is_required() {
        assert!(serde_json::from_value::<Room>(json!({ "availability": true })).is_err());
    }
}
