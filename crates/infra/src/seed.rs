//! Load fixture rooms, bookings and reviews into a store at startup.
//!
//! The seed file is a JSON object with optional `rooms`, `bookings` and
//! `reviews` arrays. Entries are validated like request bodies. Entries whose
//! `_id` already exists are skipped, so re-running a seed with explicit ids is
//! a no-op.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use roombook_core::{Booking, Document, DomainError, Review, Room, Validate};

use crate::document_store::{Collection, DocumentStore, StoreError};

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Counts of inserted documents per collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub rooms: usize,
    pub bookings: usize,
    pub reviews: usize,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed entry: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read and apply a seed file.
pub async fn load_seed_file(
    store: &dyn DocumentStore,
    path: impl AsRef<Path>,
) -> Result<SeedSummary, SeedError> {
    let raw = tokio::fs::read(path.as_ref()).await?;
    let seed: SeedData = serde_json::from_slice(&raw)?;
    apply_seed(store, seed).await
}

/// Insert every entry of `seed`, validating first so a bad file inserts nothing.
pub async fn apply_seed(store: &dyn DocumentStore, seed: SeedData) -> Result<SeedSummary, SeedError> {
    let rooms = prepare(&seed.rooms, Room::to_document)?;
    let bookings = prepare(&seed.bookings, Booking::to_document)?;
    let reviews = prepare(&seed.reviews, Review::to_document)?;

    let mut skipped = 0;
    let summary = SeedSummary {
        rooms: insert_all(store, Collection::Rooms, rooms, &mut skipped).await?,
        bookings: insert_all(store, Collection::Bookings, bookings, &mut skipped).await?,
        reviews: insert_all(store, Collection::Reviews, reviews, &mut skipped).await?,
        skipped,
    };

    tracing::info!(
        rooms = summary.rooms,
        bookings = summary.bookings,
        reviews = summary.reviews,
        skipped = summary.skipped,
        "seed applied"
    );
    Ok(summary)
}

fn prepare<T: Validate>(
    entries: &[T],
    to_document: impl Fn(&T) -> Result<Document, DomainError>,
) -> Result<Vec<Document>, DomainError> {
    entries
        .iter()
        .map(|entry| {
            entry.validate()?;
            to_document(entry)
        })
        .collect()
}

async fn insert_all(
    store: &dyn DocumentStore,
    collection: Collection,
    docs: Vec<Document>,
    skipped: &mut usize,
) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for doc in docs {
        match store.insert_one(collection, doc).await {
            Ok(_) => inserted += 1,
            Err(StoreError::DuplicateKey(detail)) => {
                tracing::warn!(%collection, %detail, "seed entry already present; skipping");
                *skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}
