//! Process-wide tracing setup shared by the server binary and tests.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Env var selecting [`LogFormat`]; JSON when unset or unrecognised.
pub const LOG_FORMAT_ENV: &str = "ROOMBOOK_LOG_FORMAT";

/// Initialize logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init() {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    crate::tracing::init(format);
}
