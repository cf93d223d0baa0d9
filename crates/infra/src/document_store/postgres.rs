//! Postgres-backed document store.
//!
//! Each collection is one table holding the whole document as `jsonb`:
//!
//! ```sql
//! CREATE TABLE rooms (seq BIGSERIAL, id TEXT PRIMARY KEY, doc JSONB NOT NULL);
//! ```
//!
//! `seq` records insertion order; it is the default ordering and the
//! tie-breaker under a sort.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateKey` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |
//! | Row decode failure | N/A | `Corrupt` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use roombook_core::{Document, ID_FIELD};

use super::query::{Collection, Filter, FindQuery, SortOrder, Update, UpdateOptions, prepare_insert};
use super::r#trait::{DeleteResult, DocumentStore, InsertOneResult, StoreError, UpdateResult};

/// Postgres-backed document store.
///
/// Thread-safe; all access goes through the SQLx pool. `update_one` locks the
/// matched row (`FOR UPDATE`) inside a transaction so read-modify-write is
/// atomic per document.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the collection tables exist.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create one table per collection if missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {} (seq BIGSERIAL, id TEXT PRIMARY KEY, doc JSONB NOT NULL)",
                collection.as_str()
            );
            sqlx::query(&ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

/// Append `WHERE <filter>` to a query.
///
/// `_id` equality goes through the `id` primary key. A non-string `_id` never
/// matches a stored document.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    qb.push(" WHERE ");
    match filter {
        Filter::All => {
            qb.push("TRUE");
        }
        Filter::Eq { field, value } if field == ID_FIELD => match value.as_str() {
            Some(id) => {
                qb.push("id = ");
                qb.push_bind(id.to_string());
            }
            None => {
                qb.push("FALSE");
            }
        },
        Filter::Eq { field, value } => {
            qb.push("doc -> ");
            qb.push_bind(field.clone());
            qb.push("::text = ");
            qb.push_bind(Json(value.clone()));
        }
    }
}

fn decode_doc(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    row.try_get::<Json<Document>, _>("doc")
        .map(|Json(doc)| doc)
        .map_err(|e| StoreError::Corrupt(format!("failed to decode document row: {e}")))
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self, query), fields(collection = %collection), err)]
    async fn find(
        &self,
        collection: Collection,
        query: FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM ");
        qb.push(collection.as_str());
        push_filter(&mut qb, &query.filter);

        qb.push(" ORDER BY ");
        if let Some(sort) = &query.sort {
            qb.push("doc -> ");
            qb.push_bind(sort.field.clone());
            qb.push(match sort.order {
                SortOrder::Ascending => "::text ASC NULLS FIRST, ",
                SortOrder::Descending => "::text DESC NULLS LAST, ",
            });
        }
        qb.push("seq ASC");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        rows.iter().map(decode_doc).collect()
    }

    #[instrument(skip(self, filter), fields(collection = %collection), err)]
    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM ");
        qb.push(collection.as_str());
        push_filter(&mut qb, &filter);
        qb.push(" ORDER BY seq ASC LIMIT 1");

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;

        row.as_ref().map(decode_doc).transpose()
    }

    #[instrument(skip(self, document), fields(collection = %collection), err)]
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        let (id, document) = prepare_insert(document)?;

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.as_str());
        sqlx::query(&sql)
            .bind(id.to_string())
            .bind(Json(&document))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_one", e))?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    #[instrument(skip(self, filter, update), fields(collection = %collection, upsert = options.upsert), err)]
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        update.check()?;
        let table = collection.as_str();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT id, doc FROM ");
        qb.push(table);
        push_filter(&mut qb, &filter);
        qb.push(" ORDER BY seq ASC LIMIT 1 FOR UPDATE");

        let row = qb
            .build()
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_one_select", e))?;

        let result = match row {
            Some(row) => {
                let id: String = row
                    .try_get("id")
                    .map_err(|e| StoreError::Corrupt(format!("failed to read id: {e}")))?;
                let mut doc = decode_doc(&row)?;

                let modified = update.apply(&mut doc);
                if modified {
                    let sql = format!("UPDATE {table} SET doc = $1 WHERE id = $2");
                    sqlx::query(&sql)
                        .bind(Json(&doc))
                        .bind(&id)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("update_one", e))?;
                }
                UpdateResult::matched(modified)
            }
            None if options.upsert => {
                let (id, doc) = update.upsert_document(&filter)?;
                let sql = format!("INSERT INTO {table} (id, doc) VALUES ($1, $2)");
                sqlx::query(&sql)
                    .bind(id.to_string())
                    .bind(Json(&doc))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("update_one_upsert", e))?;
                UpdateResult::upserted(id)
            }
            None => UpdateResult::unmatched(),
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(result)
    }

    #[instrument(skip(self, filter), fields(collection = %collection), err)]
    async fn delete_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<DeleteResult, StoreError> {
        let table = collection.as_str();
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "DELETE FROM {table} WHERE id = (SELECT id FROM {table}"
        ));
        push_filter(&mut qb, &filter);
        qb.push(" ORDER BY seq ASC LIMIT 1)");

        let done = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_one", e))?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: done.rows_affected(),
        })
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::DuplicateKey(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("decode error in {}: {}", operation, err))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    //! These run only when `DATABASE_URL` points at a disposable Postgres.
    //! Tables are dropped and recreated per test.

    use super::*;
    use crate::document_store::query::Sort;
    use roombook_core::DocumentId;
    use serde_json::json;

    async fn store() -> Option<PostgresDocumentStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.ok()?;
        for collection in Collection::ALL {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", collection.as_str()))
                .execute(&pool)
                .await
                .ok()?;
        }
        let store = PostgresDocumentStore::new(pool);
        store.ensure_schema().await.ok()?;
        Some(store)
    }

    fn doc(v: serde_json::Value) -> Document {
        roombook_core::document::to_document(&v).unwrap()
    }

    fn where_clause(filter: &Filter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM rooms");
        push_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn id_filter_uses_primary_key() {
        assert_eq!(
            where_clause(&Filter::by_id(DocumentId::new())),
            "SELECT doc FROM rooms WHERE id = $1"
        );
        assert_eq!(
            where_clause(&Filter::eq(ID_FIELD, 42)),
            "SELECT doc FROM rooms WHERE FALSE"
        );
        assert_eq!(
            where_clause(&Filter::eq("roomId", "r1")),
            "SELECT doc FROM rooms WHERE doc -> $1::text = $2"
        );
    }

    #[tokio::test]
    async fn insert_find_and_sort() {
        let Some(store) = store().await else { return };

        for price in [300, 100, 200] {
            store
                .insert_one(Collection::Rooms, doc(json!({ "price_per_night": price })))
                .await
                .unwrap();
        }

        let unsorted = store.find(Collection::Rooms, FindQuery::all()).await.unwrap();
        assert_eq!(unsorted[0]["price_per_night"], 300);

        let sorted = store
            .find(Collection::Rooms, FindQuery::all().sorted(Sort::ascending("price_per_night")))
            .await
            .unwrap();
        let prices: Vec<_> = sorted.iter().map(|d| d["price_per_night"].clone()).collect();
        assert_eq!(prices, vec![json!(100), json!(200), json!(300)]);
    }

    #[tokio::test]
    async fn duplicate_id_maps_to_duplicate_key() {
        let Some(store) = store().await else { return };

        let d = doc(json!({ "_id": DocumentId::new().to_string(), "email": "a@b.io" }));
        store.insert_one(Collection::Bookings, d.clone()).await.unwrap();
        assert!(matches!(
            store.insert_one(Collection::Bookings, d).await,
            Err(StoreError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn upsert_then_update_then_delete() {
        let Some(store) = store().await else { return };
        let id = DocumentId::new();

        let res = store
            .update_one(
                Collection::Bookings,
                Filter::by_id(id),
                Update::set("date", "2024-06-01").on_insert("email", "a@b.io"),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(res, UpdateResult::upserted(id));

        let res = store
            .update_one(
                Collection::Bookings,
                Filter::by_id(id),
                Update::set("date", "2024-07-01"),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(res, UpdateResult::matched(true));

        let found = store
            .find_one(Collection::Bookings, Filter::eq("email", "a@b.io"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["date"], "2024-07-01");

        let res = store.delete_one(Collection::Bookings, Filter::by_id(id)).await.unwrap();
        assert_eq!(res.deleted_count, 1);
        let res = store.delete_one(Collection::Bookings, Filter::by_id(id)).await.unwrap();
        assert_eq!(res.deleted_count, 0);
    }
}
