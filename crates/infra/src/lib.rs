//! Infrastructure layer: the document store and its backends.

pub mod document_store;
pub mod seed;

pub use document_store::{
    Collection, DeleteResult, DocumentStore, FindQuery, Filter, InMemoryDocumentStore,
    InsertOneResult, PostgresDocumentStore, Sort, SortOrder, StoreError, Update, UpdateOptions,
    UpdateResult,
};
