use std::sync::Arc;

use axum::{Json, extract::Extension};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::app::dto::{LoginRequest, SessionResponse, ValidJson};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Issue a session token for the given email into the `token` cookie.
pub async fn issue_session(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    ValidJson(login): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let issued = services.issuer.issue(login.email, Utc::now())?;
    tracing::info!(email = %issued.claims.email, exp = issued.claims.exp, "session issued");

    let jar = jar.add(services.cookie.session_cookie(issued.token));
    Ok((jar, Json(SessionResponse::ok())))
}

/// Clear the session cookie. Always succeeds, with or without a session.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    let jar = jar.add(services.cookie.removal_cookie());
    (jar, Json(SessionResponse::ok()))
}
