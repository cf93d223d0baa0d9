use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
};

use roombook_core::{Document, Review};
use roombook_infra::{Collection, Filter, FindQuery, InsertOneResult, Sort};

use crate::app::dto::ValidJson;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// All reviews, newest first.
pub async fn list_reviews(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let reviews = services
        .store
        .find(
            Collection::Reviews,
            FindQuery::all().sorted(Sort::descending(Review::TIME_FIELD)),
        )
        .await?;
    Ok(Json(reviews))
}

/// Reviews whose `roomId` equals the path segment verbatim.
pub async fn reviews_for_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let reviews = services
        .store
        .find(
            Collection::Reviews,
            FindQuery::filtered(Filter::eq(Review::ROOM_ID_FIELD, room_id)),
        )
        .await?;
    Ok(Json(reviews))
}

pub async fn create_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    ValidJson(review): ValidJson<Review>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = services
        .store
        .insert_one(Collection::Reviews, review.to_document()?)
        .await?;

    tracing::info!(
        review_id = %result.inserted_id,
        room_id = %review.room_id,
        author = %session.email(),
        "review recorded"
    );
    Ok(Json(result))
}
