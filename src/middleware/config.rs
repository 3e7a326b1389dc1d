use std::time::Duration;

use axum_extra::extract::cookie::Key;
use url::Url;

use super::error::AuthError;
use crate::config::{env_var_any, parse_flag};
use crate::oauth::{GoogleClient, GoogleConfig};

const DEFAULT_REDIRECT_URI: &str = "http://localhost:5031/api/account/google-response";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Shared auth settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    /// Origin without trailing slash.
    pub(crate) frontend_origin: String,
    pub(crate) profile_in_redirect: bool,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__google_signin_session".into(),
            session_ttl_days: 14,
            secure_cookies: true,
            auth_path: "/api/account".into(),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.into(),
            profile_in_redirect: true,
        }
    }
}

/// Google sign-in configuration.
///
/// The Google client is a constructor parameter; everything else has a
/// default and a `with_*` override. [`from_env()`](AuthConfig::from_env)
/// covers the usual deployment setup.
pub struct AuthConfig {
    pub(crate) client: GoogleClient,
    pub(crate) settings: AuthSettings,
}

impl AuthConfig {
    #[must_use]
    pub fn new(client: GoogleClient) -> Self {
        Self {
            client,
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `GOOGLE_CLIENT_ID` (or `Authentication__Google__ClientId`)
    /// - `GOOGLE_CLIENT_SECRET` (or `Authentication__Google__ClientSecret`)
    ///
    /// # Optional env vars
    /// - `GOOGLE_REDIRECT_URI`: callback URL registered with Google
    ///   (default `http://localhost:5031/api/account/google-response`)
    /// - `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`, `GOOGLE_USERINFO_URL`: endpoint overrides
    /// - `GOOGLE_HTTP_TIMEOUT_MS`: per-request timeout for calls to Google (default 10000)
    /// - `FRONTEND_ORIGIN`: where the callback redirects (default `http://localhost:5173`)
    /// - `COOKIE_KEY`: cookie encryption key, at least 64 bytes
    /// - `DEV_AUTH`: `1`/`true` drops the `Secure` cookie attribute for plain-HTTP development
    /// - `SESSION_TTL_DAYS`: session lifetime (default 14)
    /// - `PROFILE_IN_REDIRECT`: `false` omits email/name from the redirect URL
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or values are invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = env_var_any(&["GOOGLE_CLIENT_ID", "Authentication__Google__ClientId"])
            .ok_or_else(|| AuthError::Config("GOOGLE_CLIENT_ID is required".into()))?;
        let client_secret =
            env_var_any(&["GOOGLE_CLIENT_SECRET", "Authentication__Google__ClientSecret"])
                .ok_or_else(|| AuthError::Config("GOOGLE_CLIENT_SECRET is required".into()))?;
        let redirect_uri = parse_url(
            "GOOGLE_REDIRECT_URI",
            &env_var_any(&["GOOGLE_REDIRECT_URI"]).unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
        )?;

        let mut google = GoogleConfig::new(client_id, client_secret, redirect_uri);
        if let Some(url) = env_var_any(&["GOOGLE_AUTH_URL"]) {
            google = google.with_auth_url(parse_url("GOOGLE_AUTH_URL", &url)?);
        }
        if let Some(url) = env_var_any(&["GOOGLE_TOKEN_URL"]) {
            google = google.with_token_url(parse_url("GOOGLE_TOKEN_URL", &url)?);
        }
        if let Some(url) = env_var_any(&["GOOGLE_USERINFO_URL"]) {
            google = google.with_userinfo_url(parse_url("GOOGLE_USERINFO_URL", &url)?);
        }
        if let Some(ms) = env_var_any(&["GOOGLE_HTTP_TIMEOUT_MS"]) {
            let ms: u64 = ms
                .parse()
                .map_err(|e| AuthError::Config(format!("GOOGLE_HTTP_TIMEOUT_MS: {e}")))?;
            google = google.with_http_timeout(Duration::from_millis(ms));
        }

        let mut config = Self::new(GoogleClient::new(google));

        if let Some(origin) = env_var_any(&["FRONTEND_ORIGIN"]) {
            config = config.with_frontend_origin(&origin)?;
        }
        if let Some(k) = env_var_any(&["COOKIE_KEY"]) {
            let key = Key::try_from(k.as_bytes()).map_err(|_| {
                AuthError::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?;
            config = config.with_cookie_key(key);
        } else {
            tracing::warn!("COOKIE_KEY not set; sessions will not survive a restart");
        }
        if let Some(flag) = env_var_any(&["DEV_AUTH"]) {
            config = config.with_secure_cookies(!parse_flag("DEV_AUTH", &flag)?);
        }
        if let Some(days) = env_var_any(&["SESSION_TTL_DAYS"]) {
            let days: i64 = days
                .parse()
                .map_err(|e| AuthError::Config(format!("SESSION_TTL_DAYS: {e}")))?;
            if days <= 0 {
                return Err(AuthError::Config("SESSION_TTL_DAYS must be positive".into()));
            }
            config = config.with_session_ttl_days(days);
        }
        if let Some(flag) = env_var_any(&["PROFILE_IN_REDIRECT"]) {
            config = config.with_profile_in_redirect(parse_flag("PROFILE_IN_REDIRECT", &flag)?);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    /// Prefix for the login, callback and profile routes (default `/api/account`).
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    /// Frontend origin the callback redirects to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if `origin` is not an absolute URL.
    pub fn with_frontend_origin(mut self, origin: &str) -> Result<Self, AuthError> {
        parse_url("FRONTEND_ORIGIN", origin)?;
        self.settings.frontend_origin = origin.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Whether the callback redirect carries `email` and `name` query parameters.
    #[must_use]
    pub fn with_profile_in_redirect(mut self, enabled: bool) -> Self {
        self.settings.profile_in_redirect = enabled;
        self
    }

    #[must_use]
    pub fn frontend_origin(&self) -> &str {
        &self.settings.frontend_origin
    }

    #[must_use]
    pub fn client_config(&self) -> &GoogleConfig {
        self.client.config()
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, AuthError> {
    value
        .parse()
        .map_err(|e| AuthError::Config(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleClient {
        GoogleClient::new(GoogleConfig::new(
            "id",
            "secret",
            DEFAULT_REDIRECT_URI.parse().unwrap(),
        ))
    }

    #[test]
    fn defaults() {
        let config = AuthConfig::new(client());
        assert_eq!(config.settings.auth_path, "/api/account");
        assert_eq!(config.settings.session_ttl_days, 14);
        assert!(config.settings.secure_cookies);
        assert!(config.settings.profile_in_redirect);
        assert_eq!(config.frontend_origin(), "http://localhost:5173");
    }

    #[test]
    fn frontend_origin_is_normalized() {
        let config = AuthConfig::new(client())
            .with_frontend_origin("https://app.example.com/")
            .unwrap();
        assert_eq!(config.frontend_origin(), "https://app.example.com");
    }

    #[test]
    fn frontend_origin_must_be_absolute() {
        assert!(matches!(
            AuthConfig::new(client()).with_frontend_origin("/relative"),
            Err(AuthError::Config(_))
        ));
    }
}
