//! Signed session tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use roombook_core::Email;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// A freshly signed token together with the claims it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, or undecodable payload.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Creates session credentials. Stateless: nothing is recorded server-side.
pub trait SessionTokenIssuer: Send + Sync {
    fn issue(&self, email: Email, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;

    /// Lifetime of issued tokens.
    fn ttl(&self) -> Duration;
}

/// Verifies session credentials and returns their claims.
pub trait SessionTokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HMAC-SHA256 issuer and validator sharing one secret.
#[derive(Clone)]
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256SessionTokens {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();

        // Time checks are done by `validate_claims` against an explicit `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
}

impl core::fmt::Debug for Hs256SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256SessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokenIssuer for Hs256SessionTokens {
    fn issue(&self, email: Email, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = SessionClaims::new(email, now, self.ttl)
            .ok_or_else(|| TokenError::Signing(format!("expiry out of range for ttl {}", self.ttl)))?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl SessionTokenValidator for Hs256SessionTokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
