use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use roombook_auth::SessionTokenValidator;

use crate::app::errors::ApiError;
use crate::context::SessionContext;
use crate::session::SESSION_COOKIE;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn SessionTokenValidator>,
}

/// Session gate: admit requests carrying a valid `token` cookie and attach a
/// [`SessionContext`]; reject everything else with 401 before the handler runs.
pub async fn session_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&jar)?;

    let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        ApiError::unauthorized()
    })?;

    req.extensions_mut().insert(SessionContext::new(claims));

    Ok(next.run(req).await)
}

fn extract_session_token(jar: &CookieJar) -> Result<&str, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim())
        .unwrap_or_default();

    if token.is_empty() {
        tracing::debug!("request without session cookie");
        return Err(ApiError::unauthorized());
    }

    Ok(token)
}
