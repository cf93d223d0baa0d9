use thiserror::Error;

use crate::claims::SessionClaims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: session for '{session}' cannot act for '{owner}'")]
    NotOwner { session: String, owner: String },
}

/// Resource-level check: the session's email must be the resource owner.
///
/// - No IO
/// - Exact comparison, no case folding
pub fn authorize_owner(claims: &SessionClaims, owner: &str) -> Result<(), AuthzError> {
    if claims.email.as_str() == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner {
            session: claims.email.to_string(),
            owner: owner.to_string(),
        })
    }
}
