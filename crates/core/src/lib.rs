//! `roombook-core`: domain primitives shared by every other crate.
//!
//! Pure types only: identifiers, value objects and the document shapes that
//! are validated at the HTTP boundary before they reach the store.

pub mod booking;
pub mod document;
pub mod email;
pub mod error;
pub mod id;
pub mod review;
pub mod validate;
pub mod room;

pub use booking::Booking;
pub use document::{Document, ID_FIELD};
pub use email::Email;
pub use error::{DomainError, DomainResult};
pub use id::DocumentId;
pub use review::{Review, ReviewTime};
pub use room::Room;
pub use validate::Validate;
