use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use roombook_auth::{AuthzError, TokenError};
use roombook_core::DomainError;
use roombook_infra::StoreError;

/// Every failure a handler or the session gate can return.
///
/// Rendered as `{ "error": <code>, "message": <text> }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),

    #[error("{0}")]
    Token(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("missing or invalid session".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidId(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::InvalidId(_) => "invalid_id",
            ApiError::Validation(_) => "validation_error",
            ApiError::Conflict(_) => "conflict",
            ApiError::Store(_) => "store_error",
            ApiError::Token(_) => "token_error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(msg) => ApiError::Conflict(msg),
            StoreError::InvalidDocument(msg) => ApiError::Validation(msg),
            other => ApiError::Store(other),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidId(_) => ApiError::InvalidId(err.to_string()),
            DomainError::Validation(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => ApiError::Token(msg),
            _ => ApiError::unauthorized(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => tracing::error!(error = %e, "document store failure"),
            ApiError::Token(e) => tracing::error!(error = %e, "failed to sign session token"),
            ApiError::Forbidden(e) => tracing::debug!(error = %e, "ownership check failed"),
            _ => {}
        }

        // Internal details stay in the logs.
        let message = match &self {
            ApiError::Store(_) => "document store failure".to_string(),
            ApiError::Token(_) => "failed to issue session".to_string(),
            other => other.to_string(),
        };

        json_error(self.status(), self.code(), message)
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
