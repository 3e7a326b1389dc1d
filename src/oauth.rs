use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::identity::Claims;
use crate::pkce::{self, PkcePair};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Google `OAuth2` client configuration.
///
/// Client id, secret and redirect URI are constructor parameters; endpoints,
/// scopes and the request timeout default to Google's values.
///
/// ```rust,ignore
/// use google_signin::GoogleConfig;
///
/// let config = GoogleConfig::new(
///     "1234.apps.googleusercontent.com",
///     "client-secret",
///     "http://localhost:5031/api/account/google-response".parse()?,
/// );
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub struct GoogleConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) redirect_uri: Url,
    pub(crate) auth_url: Url,
    pub(crate) token_url: Url,
    pub(crate) userinfo_url: Url,
    pub(crate) scopes: Vec<String>,
    pub(crate) http_timeout: Duration,
}

impl GoogleConfig {
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
            auth_url: GOOGLE_AUTH_URL.parse().expect("valid default URL"),
            token_url: GOOGLE_TOKEN_URL.parse().expect("valid default URL"),
            userinfo_url: GOOGLE_USERINFO_URL.parse().expect("valid default URL"),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Override the authorization (consent screen) endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the userinfo endpoint.
    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    /// Override the scopes (default: `["openid", "email", "profile"]`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Upper bound for each request to Google (default 10 s).
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("userinfo_url", &self.userinfo_url.as_str())
            .field("scopes", &self.scopes)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// Authorization URL plus the values to keep until the callback.
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

/// Token response from Google's token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// `OAuth2` authorization-code client for Google.
pub struct GoogleClient {
    config: GoogleConfig,
    http: reqwest::Client,
}

impl GoogleClient {
    #[must_use]
    pub fn new(config: GoogleConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(config.http_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { config, http }
    }

    /// Use a custom HTTP client (connection pool reuse, proxies, tests).
    ///
    /// The configured [`http_timeout`](GoogleConfig::http_timeout) still
    /// bounds every request.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Consent-screen URL with fresh `state` and PKCE S256 challenge.
    #[must_use]
    pub fn authorization_url(&self) -> AuthorizationRequest {
        let state = pkce::generate_state();
        let pkce = PkcePair::generate();
        let scope = self.config.scopes.join(" ");

        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("code_challenge_method", "S256");

        AuthorizationRequest {
            url: url.into(),
            state,
            code_verifier: pkce.verifier,
        }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::OAuth`] if the token endpoint rejects the code.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, Error> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&params)
            .timeout(self.config.http_timeout)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token exchange").await?;
        response.json::<TokenResponse>().await.map_err(Into::into)
    }

    /// Fetch the claims bundle for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::OAuth`] if the userinfo endpoint rejects the token.
    pub async fn get_claims(&self, access_token: &str) -> Result<Claims, Error> {
        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .timeout(self.config.http_timeout)
            .send()
            .await?;

        let response = Self::ensure_success(response, "userinfo request").await?;
        response.json::<Claims>().await.map_err(Into::into)
    }

    /// Code exchange followed by the userinfo fetch.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`exchange_code`](Self::exchange_code) and
    /// [`get_claims`](Self::get_claims).
    pub async fn claims_for_code(&self, code: &str, code_verifier: &str) -> Result<Claims, Error> {
        let tokens = self.exchange_code(code, code_verifier).await?;
        self.get_claims(&tokens.access_token).await
    }

    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(Error::OAuth {
            operation,
            status: Some(status),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GoogleConfig {
        GoogleConfig::new(
            "test-client",
            "test-secret",
            "https://example.com/api/account/google-response"
                .parse()
                .unwrap(),
        )
    }

    #[test]
    fn authorization_url_has_pkce_and_scopes() {
        let client = GoogleClient::new(test_config());
        let req = client.authorization_url();
        let url: Url = req.url.parse().unwrap();
        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["client_id"], "test-client");
        assert_eq!(
            query["redirect_uri"],
            "https://example.com/api/account/google-response"
        );
        assert_eq!(query["scope"], "openid email profile");
        assert_eq!(query["state"], req.state);
        assert_eq!(query["code_challenge_method"], "S256");
        assert_eq!(
            query["code_challenge"],
            pkce::challenge_for(&req.code_verifier)
        );
        assert!(!query.contains_key("client_secret"));
    }

    #[test]
    fn authorization_url_unique_per_call() {
        let client = GoogleClient::new(test_config());
        let a = client.authorization_url();
        let b = client.authorization_url();

        assert_ne!(a.state, b.state);
        assert_ne!(a.code_verifier, b.code_verifier);
    }

    #[test]
    fn config_overrides() {
        let config = test_config()
            .with_token_url("http://127.0.0.1:9/token".parse().unwrap())
            .with_scopes(vec!["openid".into()])
            .with_http_timeout(Duration::from_millis(750));

        assert_eq!(config.token_url().as_str(), "http://127.0.0.1:9/token");
        assert_eq!(config.auth_url().as_str(), GOOGLE_AUTH_URL);
        assert_eq!(config.scopes(), &["openid"]);
        assert_eq!(config.http_timeout(), Duration::from_millis(750));
        assert_eq!(test_config().http_timeout(), DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", test_config());
        assert!(rendered.contains("test-client"));
        assert!(!rendered.contains("test-secret"));
    }
}
