use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
};

use roombook_core::Document;
use roombook_infra::{Collection, Filter, FindQuery, Sort, Update, UpdateOptions, UpdateResult};

use crate::app::dto::{SetAvailabilityRequest, ValidJson};
use crate::app::errors::ApiError;
use crate::app::routes::parse_id;
use crate::app::services::AppServices;

const PRICE_FIELD: &str = "price_per_night";
const AVAILABILITY_FIELD: &str = "availability";

pub async fn list_rooms(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let rooms = services.store.find(Collection::Rooms, FindQuery::all()).await?;
    Ok(Json(rooms))
}

/// Rooms by ascending `price_per_night`; equal prices keep insertion order.
pub async fn list_rooms_by_price(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let rooms = services
        .store
        .find(Collection::Rooms, FindQuery::all().sorted(Sort::ascending(PRICE_FIELD)))
        .await?;
    Ok(Json(rooms))
}

/// One room, or JSON `null` when the id matches nothing.
pub async fn get_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    let id = parse_id(&id)?;
    let room = services.store.find_one(Collection::Rooms, Filter::by_id(id)).await?;
    Ok(Json(room))
}

/// Replace a room's `availability`. Upserts: an unknown id creates a bare
/// room document holding only `_id` and `availability`.
pub async fn set_availability(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<SetAvailabilityRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let result = services
        .store
        .update_one(
            Collection::Rooms,
            Filter::by_id(id),
            Update::set(AVAILABILITY_FIELD, body.availability),
            UpdateOptions::upsert(),
        )
        .await?;

    tracing::info!(
        room_id = %id,
        availability = body.availability,
        matched = result.matched_count,
        "room availability set"
    );
    Ok(Json(result))
}
