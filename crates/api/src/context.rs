use roombook_auth::SessionClaims;
use roombook_core::Email;

/// Verified session attached to a request by the session gate.
///
/// Present in request extensions for every route behind the gate; handlers
/// take it as `Extension<SessionContext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    claims: SessionClaims,
}

impl SessionContext {
    pub fn new(claims: SessionClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn email(&self) -> &Email {
        &self.claims.email
    }
}
