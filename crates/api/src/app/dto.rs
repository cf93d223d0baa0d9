use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use roombook_core::{DomainError, DomainResult, Email, Validate};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// `POST /jwt` body. The email is trusted as given; there is no user store.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Email,
}

impl Validate for LoginRequest {
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }
}

/// `PATCH /bookRoom/:id` body.
#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub availability: bool,
}

impl Validate for SetAvailabilityRequest {
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }
}

/// `PATCH /updateDate/:id` body.
#[derive(Debug, Deserialize)]
pub struct SetDateRequest {
    pub date: String,
}

impl Validate for SetDateRequest {
    fn validate(&self) -> DomainResult<()> {
        if self.date.trim().is_empty() {
            return Err(DomainError::validation("date must not be empty"));
        }
        Ok(())
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
}

impl SessionResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// -------------------------
// Extractors
// -------------------------

/// JSON body that has been deserialized and passed [`Validate`].
///
/// Any failure (wrong content type, malformed JSON, missing fields, failed
/// validation) is a 400 `validation_error`.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde_json::json;

    async fn extract<T: DeserializeOwned + Validate>(body: serde_json::Value) -> Result<T, ApiError> {
        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        ValidJson::<T>::from_request(req, &()).await.map(|ValidJson(v)| v)
    }

    #[tokio::test]
    async fn accepts_valid_login() {
        let login: LoginRequest = extract(json!({ "email": "a@b.com" })).await.unwrap();
        assert_eq!(login.email.as_str(), "a@b.com");
    }

    #[tokio::test]
    async fn malformed_email_is_a_validation_error() {
        let err = extract::<LoginRequest>(json!({ "email": "nope" })).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation_error");
    }

    #[tokio::test]
    async fn blank_date_fails_validation() {
        let err = extract::<SetDateRequest>(json!({ "date": "  " })).await.unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[tokio::test]
    async fn wrong_type_is_rejected() {
        let err = extract::<SetAvailabilityRequest>(json!({ "availability": "yes" }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
