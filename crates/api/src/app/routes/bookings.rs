use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
};

use roombook_auth::authorize_owner;
use roombook_core::{Booking, Document, DocumentId};
use roombook_infra::{
    Collection, DeleteResult, Filter, FindQuery, InsertOneResult, Update, UpdateOptions,
    UpdateResult,
};

use crate::app::dto::{SetDateRequest, ValidJson};
use crate::app::errors::ApiError;
use crate::app::routes::parse_id;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// Bookings owned by the session. The path email must equal the session email.
pub async fn my_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    authorize_owner(session.claims(), &email)?;

    let bookings = services
        .store
        .find(
            Collection::Bookings,
            FindQuery::filtered(Filter::eq(Booking::EMAIL_FIELD, session.email().as_str())),
        )
        .await?;
    Ok(Json(bookings))
}

/// Insert the body as a booking. Sessions may only book for themselves.
pub async fn create_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    ValidJson(booking): ValidJson<Booking>,
) -> Result<Json<InsertOneResult>, ApiError> {
    authorize_owner(session.claims(), booking.email.as_str())?;

    let result = services
        .store
        .insert_one(Collection::Bookings, booking.to_document()?)
        .await?;

    tracing::info!(booking_id = %result.inserted_id, "booking created");
    Ok(Json(result))
}

/// Replace a booking's `date`. Upserts: an unknown id creates a booking owned
/// by the session.
pub async fn update_date(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<SetDateRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    ensure_owner_if_present(&services, &session, id).await?;

    let update = Update::set(Booking::DATE_FIELD, body.date)
        .on_insert(Booking::EMAIL_FIELD, session.email().as_str());
    let result = services
        .store
        .update_one(Collection::Bookings, Filter::by_id(id), update, UpdateOptions::upsert())
        .await?;
    Ok(Json(result))
}

/// Delete a booking by id. Unknown ids report `deletedCount: 0`.
pub async fn delete_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;
    ensure_owner_if_present(&services, &session, id).await?;

    let result = services
        .store
        .delete_one(Collection::Bookings, Filter::by_id(id))
        .await?;

    tracing::info!(booking_id = %id, deleted = result.deleted_count, "booking deleted");
    Ok(Json(result))
}

/// 403 when the booking exists and belongs to someone else. A stored booking
/// without an `email` is owned by nobody.
async fn ensure_owner_if_present(
    services: &AppServices,
    session: &SessionContext,
    id: DocumentId,
) -> Result<(), ApiError> {
    let existing = services
        .store
        .find_one(Collection::Bookings, Filter::by_id(id))
        .await?;

    if let Some(doc) = existing {
        authorize_owner(session.claims(), Booking::owner_of(&doc).unwrap_or_default())?;
    }
    Ok(())
}
