//! Server configuration.
//!
//! Everything is environment-driven:
//!
//! ```bash
//! FACTURE_DATABASE_URL=sqlite://facture.db   # also a CLI flag
//! FACTURE_CLIENT_ORIGIN=http://localhost:5173
//! FACTURE_ENV=production                     # secure cookies, SameSite=None
//! ```

use std::env;

use axum::http::HeaderValue;
use thiserror::Error;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "facture_sid";

/// Backing-store session lifetime. Longer than the cookie lifetime on
/// purpose: the cookie refresh should outlive short gaps while the store is
/// cleaned up independently.
pub const SESSION_TTL_DAYS: i64 = 14;

/// Rolling cookie lifetime.
pub const COOKIE_MAX_AGE_DAYS: i64 = 1;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Origin allowed to call the API with credentials.
    pub client_origin: HeaderValue,
    /// Production mode: secure cookies, cross-site cookie policy.
    pub production: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid client origin: {0}")]
    InvalidOrigin(String),
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let origin =
            env::var("FACTURE_CLIENT_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());
        let client_origin = origin
            .parse::<HeaderValue>()
            .map_err(|_| ConfigError::InvalidOrigin(origin))?;

        let production = env::var("FACTURE_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            client_origin,
            production,
        })
    }

    /// Configuration for tests (development mode, default origin).
    pub fn test() -> Self {
        Self {
            client_origin: HeaderValue::from_static("http://localhost:5173"),
            production: false,
        }
    }
}
