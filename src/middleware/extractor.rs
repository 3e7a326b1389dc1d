use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;

use super::error::AuthError;
use super::state::AuthState;
use super::types::SessionClaims;
use crate::store::UserStore;
use crate::types::{SubjectId, UserId};

/// Authenticated session extracted from the encrypted session cookie.
///
/// Use as an Axum extractor in handlers mounted on the auth router's state.
/// Rejects with `401 Unauthorized` when there is no live session.
///
/// # Example
///
/// ```rust,ignore
/// async fn whoami(session: AuthSession) -> impl IntoResponse {
///     format!("Hello, {}", session.subject_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Google subject id the session was issued for.
    pub subject_id: SubjectId,
    /// Store-assigned user id at sign-in time.
    pub user_id: Option<UserId>,
}

impl<S: UserStore> FromRequestParts<AuthState<S>> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<S>,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::Unauthorized)?;

        let claims = read_session(&jar, &state.settings.session_cookie_name)?;
        let subject_id = claims.sub.ok_or(AuthError::MissingSessionSubject)?;

        Ok(Self {
            subject_id,
            user_id: claims.uid,
        })
    }
}

/// Decrypt and validate the session cookie.
///
/// Missing, undecryptable, unparsable and expired cookies are all
/// [`AuthError::Unauthorized`].
pub(super) fn read_session(
    jar: &PrivateCookieJar,
    cookie_name: &str,
) -> Result<SessionClaims, AuthError> {
    let cookie = jar.get(cookie_name).ok_or(AuthError::Unauthorized)?;

    let claims: SessionClaims = serde_json::from_str(cookie.value()).map_err(|e| {
        tracing::debug!(error = %e, "Discarding unreadable session cookie");
        AuthError::Unauthorized
    })?;

    if claims.is_expired() {
        tracing::debug!(exp = claims.exp, "Session expired");
        return Err(AuthError::Unauthorized);
    }

    Ok(claims)
}
