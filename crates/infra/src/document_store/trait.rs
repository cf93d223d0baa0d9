use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use roombook_core::{Document, DocumentId};

use super::query::{Collection, Filter, FindQuery, Update, UpdateOptions};

/// Result of `insert_one`, shaped the way document-store drivers report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

/// Result of `update_one`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<DocumentId>,
}

impl UpdateResult {
    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
            ..Self::unmatched()
        }
    }

    pub fn upserted(id: DocumentId) -> Self {
        Self {
            upserted_count: 1,
            upserted_id: Some(id),
            ..Self::unmatched()
        }
    }
}

/// Result of `delete_one`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Document store operation error.
///
/// ## Error Categories
///
/// - **DuplicateKey**: an insert reused an existing `_id`
/// - **InvalidDocument**: the document or update cannot be stored as given
/// - **Corrupt**: stored data could not be decoded
/// - **Backend**: connection, pool or query failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Schemaless document store over the three booking collections.
///
/// ## Semantics
///
/// - `find` returns matching documents in insertion order unless a sort is
///   given; ties under a sort keep insertion order.
/// - `update_one` and `delete_one` act on the first match in insertion order.
/// - `update_one` with `upsert` inserts a new document built from the filter's
///   equality fields, `set` and `set_on_insert` when nothing matches.
/// - `_id` is unique per collection and generated (UUIDv7) when missing.
///
/// Implementations must be safe for concurrent use; concurrent updates to the
/// same document are last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError>;

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<DeleteResult, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).find(collection, query).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        (**self).find_one(collection, filter).await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        (**self).insert_one(collection, document).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        (**self).update_one(collection, filter, update, options).await
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<DeleteResult, StoreError> {
        (**self).delete_one(collection, filter).await
    }
}
