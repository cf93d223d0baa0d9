//! Process configuration read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use chrono::Duration;
use thiserror::Error;

pub const BIND_ENV: &str = "ROOMBOOK_BIND";
pub const SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const ENVIRONMENT_ENV: &str = "ROOMBOOK_ENV";
pub const ORIGINS_ENV: &str = "ROOMBOOK_ALLOWED_ORIGINS";
pub const TTL_ENV: &str = "ROOMBOOK_TOKEN_TTL_HOURS";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const SEED_ENV: &str = "ROOMBOOK_SEED";

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";
const DEFAULT_TTL_HOURS: i64 = 24;
const MAX_TTL_HOURS: i64 = 24 * 366;
const DEV_SECRET: &str = "roombook-dev-secret";

/// Deployment mode. Production hardens the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ROOMBOOK_BIND: invalid socket address {0:?}")]
    InvalidBind(String),

    #[error("ROOMBOOK_ENV: expected `development` or `production`, got {0:?}")]
    InvalidEnvironment(String),

    #[error("ROOMBOOK_ALLOWED_ORIGINS: invalid origin {0:?}")]
    InvalidOrigin(String),

    #[error("ROOMBOOK_TOKEN_TTL_HOURS: expected 1 to 8784 hours, got {0:?}")]
    InvalidTtl(String),

    #[error("ACCESS_TOKEN_SECRET must be set in production")]
    MissingSecret,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub token_secret: String,
    pub environment: Environment,
    pub allowed_origins: Vec<HeaderValue>,
    pub token_ttl: Duration,
    pub database_url: Option<String>,
    pub seed_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = var(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        let environment = match var(ENVIRONMENT_ENV) {
            None => Environment::Development,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "development" | "dev" => Environment::Development,
                "production" | "prod" => Environment::Production,
                _ => return Err(ConfigError::InvalidEnvironment(raw)),
            },
        };

        let token_secret = match var(SECRET_ENV) {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::MissingSecret),
            None => {
                tracing::warn!("{SECRET_ENV} not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        let origins_raw = var(ORIGINS_ENV).unwrap_or_else(|| DEFAULT_ORIGINS.to_string());
        let allowed_origins = origins_raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                if !(o.starts_with("http://") || o.starts_with("https://")) {
                    return Err(ConfigError::InvalidOrigin(o.to_string()));
                }
                HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let token_ttl = match var(TTL_ENV) {
            None => Duration::hours(DEFAULT_TTL_HOURS),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| (1..=MAX_TTL_HOURS).contains(hours))
                .and_then(Duration::try_hours)
                .ok_or(ConfigError::InvalidTtl(raw))?,
        };

        Ok(Self {
            bind_addr,
            token_secret,
            environment,
            allowed_origins,
            token_ttl,
            database_url: var(DATABASE_URL_ENV),
            seed_path: var(SEED_ENV).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.token_secret, DEV_SECRET);
        assert!(config.database_url.is_none());
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn production_requires_a_secret() {
        assert_eq!(
            load(&[(ENVIRONMENT_ENV, "production")]).unwrap_err(),
            ConfigError::MissingSecret
        );

        let config = load(&[(ENVIRONMENT_ENV, "production"), (SECRET_ENV, "k")]).unwrap();
        assert!(config.environment.is_production());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config = load(&[(ORIGINS_ENV, " https://a.example , https://b.example,")]).unwrap();
        assert_eq!(
            config.allowed_origins,
            vec![
                HeaderValue::from_static("https://a.example"),
                HeaderValue::from_static("https://b.example"),
            ]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(load(&[(BIND_ENV, "nope")]), Err(ConfigError::InvalidBind(_))));
        assert!(matches!(load(&[(TTL_ENV, "0")]), Err(ConfigError::InvalidTtl(_))));
        assert!(matches!(load(&[(TTL_ENV, "soon")]), Err(ConfigError::InvalidTtl(_))));
        assert!(matches!(load(&[(ORIGINS_ENV, "localhost:5173")]), Err(ConfigError::InvalidOrigin(_))));
        assert!(matches!(load(&[(ENVIRONMENT_ENV, "staging")]), Err(ConfigError::InvalidEnvironment(_))));
    }

    #[test]
    fn ttl_is_bounded_to_a_year() {
        let config = load(&[(TTL_ENV, "8784")]).unwrap();
        assert_eq!(config.token_ttl, Duration::hours(8784));

        for oversized in ["8785", "100000000000", "3000000000000000", "9223372036854775807"] {
            assert_eq!(
                load(&[(TTL_ENV, oversized)]).unwrap_err(),
                ConfigError::InvalidTtl(oversized.to_string())
            );
        }
    }

    #[test]
    fn optional_backends_are_picked_up() {
        let config = load(&[
            (DATABASE_URL_ENV, "postgres://localhost/roombook"),
            (SEED_ENV, "/srv/seed.json"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/roombook"));
        assert_eq!(config.seed_path, Some(PathBuf::from("/srv/seed.json")));
    }
}
