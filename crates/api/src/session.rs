//! Session cookie shape.

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::Environment;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Attributes of the session cookie, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: time::Duration,
}

impl SessionCookiePolicy {
    /// Production: `Secure; SameSite=None` so cross-site frontends can send it.
    /// Otherwise `SameSite=Strict` over plain HTTP.
    pub fn for_environment(environment: Environment, ttl: chrono::Duration) -> Self {
        let max_age = time::Duration::seconds(ttl.num_seconds());
        if environment.is_production() {
            Self {
                secure: true,
                same_site: SameSite::None,
                max_age,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Strict,
                max_age,
            }
        }
    }

    /// HTTP-only cookie holding `token`, scoped to `/`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .path("/")
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(self.max_age)
            .build()
    }

    /// Cookie that makes the client drop the session (`Max-Age=0`, expired).
    ///
    /// Built with the same attributes as the session cookie so browsers match
    /// and replace it.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}
