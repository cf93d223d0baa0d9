//! Schemaless document storage boundary.
//!
//! Three logical collections of JSON documents keyed by `_id`, accessed with
//! the five single-document/listing operations the HTTP handlers need. No
//! transactions span operations; each call stands alone.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::{Collection, Filter, FindQuery, Sort, SortOrder, Update, UpdateOptions};
pub use r#trait::{DeleteResult, DocumentStore, InsertOneResult, StoreError, UpdateResult};
