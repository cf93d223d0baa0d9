//! `roombook-auth`: session credentials and ownership checks.
//!
//! No HTTP or storage here: this crate signs and
//! verifies tokens and answers "may this session act on that owner's data".
//! Cookies and request plumbing live in the API crate.

pub mod authorize;
pub mod claims;
pub mod token;

pub use authorize::{AuthzError, authorize_owner};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use token::{
    Hs256SessionTokens, IssuedToken, SessionTokenIssuer, SessionTokenValidator, TokenError,
};
