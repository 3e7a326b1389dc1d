use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::store::StoreError;

/// Sign-in and session errors. Every variant ends the current request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider redirect or the code exchange did not produce claims.
    #[error("Error authenticating with Google.")]
    AuthenticationFailed,

    /// Claims bundle has no usable `sub`.
    #[error("GoogleId is missing from the authentication response.")]
    MissingSubjectId,

    /// First sign-in without email or name.
    #[error(
        "Required user information (email or name) is missing from the Google authentication response."
    )]
    MissingProfileFields,

    /// User store failed or timed out.
    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),

    /// No valid session.
    #[error("Not authenticated")]
    Unauthorized,

    /// Session decoded but carries no subject id.
    #[error("GoogleId not found in the user claims.")]
    MissingSessionSubject,

    /// Session cookie could not be written.
    #[error("Session error: {0}")]
    Session(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthenticationFailed | Self::MissingSubjectId | Self::MissingProfileFields => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::MissingSessionSubject => {
                (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
            }
            Self::StoreUnavailable(_) => {
                tracing::error!(error = %self, "User store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable").into_response()
            }
            Self::Session(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn render(err: AuthError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn client_errors_are_plain_text_400() {
        let (status, body) = render(AuthError::MissingSubjectId).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "GoogleId is missing from the authentication response.");

        let (status, body) = render(AuthError::AuthenticationFailed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Error authenticating with Google.");

        let (status, body) = render(AuthError::MissingProfileFields).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Required user information (email or name) is missing"));
    }

    #[tokio::test]
    async fn unauthorized_has_empty_body() {
        let (status, body) = render(AuthError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_empty());

        let (status, body) = render(AuthError::MissingSessionSubject).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "GoogleId not found in the user claims.");
    }

    #[tokio::test]
    async fn store_failure_hides_detail() {
        let (status, body) = render(StoreError::Unavailable("disk on fire".into()).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.contains("disk"));
    }
}
