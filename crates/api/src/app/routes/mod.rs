use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

use roombook_core::DocumentId;

use crate::app::errors::ApiError;
use crate::middleware::{AuthState, session_middleware};

pub mod bookings;
pub mod reviews;
pub mod rooms;
pub mod session;
pub mod system;

/// Every route. Reads are public; writes other than `/jwt` and `/logout` sit
/// behind the session gate.
pub fn router(auth: AuthState) -> Router {
    let gate = || from_fn_with_state(auth.clone(), session_middleware);

    Router::new()
        .route("/", get(system::greeting))
        .route("/health", get(system::health))
        // Rooms
        .route("/rooms", get(rooms::list_rooms))
        .route("/roomsSort", get(rooms::list_rooms_by_price))
        .route("/room/:id", get(rooms::get_room))
        .route("/bookRoom/:id", patch(rooms::set_availability).route_layer(gate()))
        // Reviews
        .route(
            "/reviews",
            get(reviews::list_reviews).merge(post(reviews::create_review).route_layer(gate())),
        )
        .route("/reviews/:id", get(reviews::reviews_for_room))
        // Bookings
        .route("/myRooms/:email", get(bookings::my_bookings).route_layer(gate()))
        .route("/bookings", post(bookings::create_booking).route_layer(gate()))
        .route("/updateDate/:id", patch(bookings::update_date).route_layer(gate()))
        .route("/deleteBookings/:id", delete(bookings::delete_booking).route_layer(gate()))
        // Session
        .route("/jwt", post(session::issue_session))
        .route("/logout", post(session::logout))
}

/// Parse a path identifier; malformed ids are 400 `invalid_id`.
pub(crate) fn parse_id(raw: &str) -> Result<DocumentId, ApiError> {
    Ok(raw.parse::<DocumentId>()?)
}
