use std::sync::Arc;

use anyhow::Context;

use roombook_auth::{Hs256SessionTokens, SessionTokenIssuer, SessionTokenValidator};
use roombook_infra::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, seed};

use crate::config::{AppConfig, Environment};
use crate::session::SessionCookiePolicy;

/// Everything handlers need, constructed once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn DocumentStore>,
    pub issuer: Arc<dyn SessionTokenIssuer>,
    pub validator: Arc<dyn SessionTokenValidator>,
    pub cookie: SessionCookiePolicy,
}

impl AppServices {
    /// Wire a store with HS256 session tokens (one secret signs and verifies).
    ///
    /// The cookie `Max-Age` is taken from the token lifetime.
    pub fn new(store: Arc<dyn DocumentStore>, tokens: Hs256SessionTokens, environment: Environment) -> Self {
        let cookie = SessionCookiePolicy::for_environment(environment, tokens.ttl());
        let tokens = Arc::new(tokens);
        Self {
            store,
            issuer: tokens.clone(),
            validator: tokens,
            cookie,
        }
    }
}

/// Build services from configuration.
///
/// - `DATABASE_URL` set: Postgres backend (schema created if missing)
/// - otherwise: in-memory backend
/// - `ROOMBOOK_SEED` set: the seed file is loaded into whichever backend was chosen
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres document store");
            let store = PostgresDocumentStore::connect(url)
                .await
                .context("failed to connect to Postgres")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    if let Some(path) = &config.seed_path {
        seed::load_seed_file(store.as_ref(), path)
            .await
            .with_context(|| format!("failed to load seed file {}", path.display()))?;
    }

    let tokens = Hs256SessionTokens::new(&config.token_secret, config.token_ttl);
    Ok(AppServices::new(store, tokens, config.environment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn cookie_lifetime_follows_token_ttl() {
        let services = AppServices::new(
            Arc::new(InMemoryDocumentStore::new()),
            Hs256SessionTokens::new("k", Duration::hours(2)),
            Environment::Production,
        );

        assert_eq!(services.issuer.ttl(), Duration::hours(2));
        assert_eq!(services.cookie.max_age, time::Duration::hours(2));
        assert!(services.cookie.secure);
    }
}
