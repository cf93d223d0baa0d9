//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and session token wiring
//! - `routes/`: HTTP handlers, one file per collection
//! - `dto.rs`: request/response DTOs and the validating JSON extractor
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Extension, Router,
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    response::Response,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(config: &AppConfig, services: AppServices) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.validator.clone(),
    };

    routes::router(auth_state)
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request| {
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                status = tracing::field::Empty,
                                ms = tracing::field::Empty,
                            )
                        })
                        .on_response(|response: &Response, latency: Duration, span: &Span| {
                            span.record("status", tracing::field::display(response.status()));
                            span.record("ms", latency_ms(latency));
                            tracing::info!("response sent");
                        }),
                )
                .layer(cors(config)),
        )
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn latency_ms(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

fn cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.allowed_origins.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_saturates_instead_of_wrapping() {
        assert_eq!(latency_ms(Duration::from_micros(2_500)), 2);
        assert_eq!(latency_ms(Duration::MAX), u64::MAX);
    }
}
