//! Startup configuration.
//!
//! Everything is read once from the environment and then passed around by
//! reference; nothing here is mutated after construction.

use std::net::SocketAddr;
use std::time::Duration;

use crate::middleware::{AuthConfig, AuthError};

const DEFAULT_DATABASE_URL: &str = "sqlite://google-signin.db";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5031";

/// User store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// sqlx connection string, e.g. `sqlite://google-signin.db`.
    pub database_url: String,
    /// Upper bound for any single store call, including pool acquisition.
    pub timeout: Duration,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            timeout: Duration::from_secs(5),
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    /// Read store settings from the environment.
    ///
    /// # Optional env vars
    /// - `DATABASE_URL`: sqlx connection string (default `sqlite://google-signin.db`)
    /// - `STORE_TIMEOUT_MS`: per-call timeout in milliseconds (default 5000)
    /// - `STORE_MAX_CONNECTIONS`: pool size (default 5)
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, AuthError> {
        let mut config = Self::default();

        if let Some(url) = env_var_any(&["DATABASE_URL"]) {
            config.database_url = url;
        }
        if let Some(ms) = env_var_any(&["STORE_TIMEOUT_MS"]) {
            let ms: u64 = ms
                .parse()
                .map_err(|e| AuthError::Config(format!("STORE_TIMEOUT_MS: {e}")))?;
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = env_var_any(&["STORE_MAX_CONNECTIONS"]) {
            config.max_connections = n
                .parse()
                .map_err(|e| AuthError::Config(format!("STORE_MAX_CONNECTIONS: {e}")))?;
        }

        Ok(config)
    }
}

/// Everything the server binary needs, built once at startup.
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Read the full server configuration from the environment.
    ///
    /// `BIND_ADDRESS` defaults to `127.0.0.1:5031`. See [`StoreConfig::from_env`]
    /// and [`AuthConfig::from_env`] for the rest.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] for missing or malformed variables.
    pub fn from_env() -> Result<Self, AuthError> {
        let bind_address = env_var_any(&["BIND_ADDRESS"])
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .parse()
            .map_err(|e| AuthError::Config(format!("BIND_ADDRESS: {e}")))?;

        Ok(Self {
            bind_address,
            store: StoreConfig::from_env()?,
            auth: AuthConfig::from_env()?,
        })
    }
}

/// First non-empty value among `names`.
pub(crate) fn env_var_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// `1`/`true`/`yes` (any case) is true, `0`/`false`/`no` is false.
pub(crate) fn parse_flag(name: &str, value: &str) -> Result<bool, AuthError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(AuthError::Config(format!("{name}: expected a boolean, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.database_url, "sqlite://google-signin.db");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn flags() {
        assert!(parse_flag("X", "1").unwrap());
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(!parse_flag("X", "no").unwrap());
        assert!(matches!(parse_flag("X", "maybe"), Err(AuthError::Config(_))));
    }

    #[test]
    fn env_var_any_skips_unset() {
        assert_eq!(env_var_any(&["GOOGLE_SIGNIN_TEST_SURELY_UNSET_VAR"]), None);
    }
}
