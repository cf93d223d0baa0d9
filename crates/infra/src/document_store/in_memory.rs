use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use roombook_core::{Document, DocumentId, document};

use super::query::{Collection, Filter, FindQuery, Update, UpdateOptions, prepare_insert};
use super::r#trait::{DeleteResult, DocumentStore, InsertOneResult, StoreError, UpdateResult};

/// In-memory document store.
///
/// Intended for tests/dev. Collections are plain vectors in insertion order;
/// every operation is a linear scan.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }

    fn contains_id(docs: &[Document], id: DocumentId) -> bool {
        docs.iter()
            .any(|d| matches!(document::id_of(d), Ok(Some(existing)) if existing == id))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        let mut docs: Vec<Document> = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort: ties keep insertion order.
        if let Some(sort) = &query.sort {
            docs.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        let (id, document) = prepare_insert(document)?;

        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let docs = collections.entry(collection).or_default();
        if Self::contains_id(docs, id) {
            return Err(StoreError::DuplicateKey(format!("{collection} _id {id}")));
        }
        docs.push(document);

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        update.check()?;

        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let docs = collections.entry(collection).or_default();

        if let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) {
            let modified = update.apply(doc);
            return Ok(UpdateResult::matched(modified));
        }

        if !options.upsert {
            return Ok(UpdateResult::unmatched());
        }

        let (id, document) = update.upsert_document(&filter)?;
        if Self::contains_id(docs, id) {
            return Err(StoreError::DuplicateKey(format!("{collection} _id {id}")));
        }
        docs.push(document);
        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let deleted = match collections.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|d| filter.matches(d)) {
                Some(idx) => {
                    docs.remove(idx);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::query::Sort;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn doc(v: Value) -> Document {
        document::to_document(&v).unwrap()
    }

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[tokio::test]
    async fn find_returns_insertion_order() {
        let store = InMemoryDocumentStore::new();
        for price in [300, 100, 200] {
            store
                .insert_one(Collection::Rooms, doc(json!({ "price_per_night": price })))
                .await
                .unwrap();
        }

        let rooms = store.find(Collection::Rooms, FindQuery::all()).await.unwrap();
        let prices: Vec<_> = rooms.iter().map(|r| r["price_per_night"].clone()).collect();
        assert_eq!(prices, vec![json!(300), json!(100), json!(200)]);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_one(Collection::Rooms, doc(json!({ "price_per_night": 1 })))
            .await
            .unwrap();
        assert!(store.find(Collection::Bookings, FindQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();
        let d = doc(json!({ "_id": id.to_string() }));
        store.insert_one(Collection::Bookings, d.clone()).await.unwrap();
        assert!(matches!(
            store.insert_one(Collection::Bookings, d).await,
            Err(StoreError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn update_without_upsert_on_missing_is_a_noop() {
        let store = InMemoryDocumentStore::new();
        let res = store
            .update_one(
                Collection::Rooms,
                Filter::by_id(DocumentId::new()),
                Update::set("availability", true),
                UpdateOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(res, UpdateResult::unmatched());
        assert!(store.find(Collection::Rooms, FindQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_inserts_then_matches() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        let first = store
            .update_one(
                Collection::Rooms,
                Filter::by_id(id),
                Update::set("availability", false),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(first, UpdateResult::upserted(id));

        let second = store
            .update_one(
                Collection::Rooms,
                Filter::by_id(id),
                Update::set("availability", false),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(second, UpdateResult::matched(false));

        let third = store
            .update_one(
                Collection::Rooms,
                Filter::by_id(id),
                Update::set("availability", true),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(third, UpdateResult::matched(true));

        let room = store
            .find_one(Collection::Rooms, Filter::by_id(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(room["availability"], true);
    }

    #[tokio::test]
    async fn delete_removes_only_first_match() {
        let store = InMemoryDocumentStore::new();
        for _ in 0..2 {
            store
                .insert_one(Collection::Reviews, doc(json!({ "roomId": "r1", "time": 1 })))
                .await
                .unwrap();
        }

        let res = store
            .delete_one(Collection::Reviews, Filter::eq("roomId", "r1"))
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 1);

        let res = store
            .delete_one(Collection::Reviews, Filter::eq("roomId", "nope"))
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 0);

        let left = store
            .find(Collection::Reviews, FindQuery::filtered(Filter::eq("roomId", "r1")))
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
    }

    proptest! {
        #[test]
        fn ascending_sort_is_non_decreasing(prices in proptest::collection::vec(0u32..10_000, 0..40)) {
            let store = InMemoryDocumentStore::new();
            let sorted = block_on(async {
                for p in &prices {
                    store
                        .insert_one(Collection::Rooms, doc(json!({ "price_per_night": p })))
                        .await
                        .unwrap();
                }
                store
                    .find(Collection::Rooms, FindQuery::all().sorted(Sort::ascending("price_per_night")))
                    .await
                    .unwrap()
            });

            prop_assert_eq!(sorted.len(), prices.len());
            for pair in sorted.windows(2) {
                prop_assert!(pair[0]["price_per_night"].as_u64() <= pair[1]["price_per_night"].as_u64());
            }
        }

        #[test]
        fn descending_sort_is_non_increasing(times in proptest::collection::vec(any::<i64>(), 0..40)) {
            let store = InMemoryDocumentStore::new();
            let sorted = block_on(async {
                for t in &times {
                    store
                        .insert_one(Collection::Reviews, doc(json!({ "roomId": "r", "time": t })))
                        .await
                        .unwrap();
                }
                store
                    .find(Collection::Reviews, FindQuery::all().sorted(Sort::descending("time")))
                    .await
                    .unwrap()
            });

            for pair in sorted.windows(2) {
                prop_assert!(pair[0]["time"].as_i64() >= pair[1]["time"].as_i64());
            }
        }

        #[test]
        fn equality_filter_returns_exactly_the_matches(owners in proptest::collection::vec(0u8..4, 0..30)) {
            let store = InMemoryDocumentStore::new();
            let found = block_on(async {
                for o in &owners {
                    store
                        .insert_one(Collection::Bookings, doc(json!({ "email": format!("u{o}@x.io") })))
                        .await
                        .unwrap();
                }
                store
                    .find(Collection::Bookings, FindQuery::filtered(Filter::eq("email", "u1@x.io")))
                    .await
                    .unwrap()
            });

            let expected = owners.iter().filter(|o| **o == 1).count();
            prop_assert_eq!(found.len(), expected);
            prop_assert!(found.iter().all(|d| d["email"] == "u1@x.io"));
        }
    }
}
