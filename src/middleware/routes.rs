use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header::LOCATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::config::{AuthConfig, AuthSettings};
use super::cookies;
use super::error::AuthError;
use super::extractor::AuthSession;
use super::state::AuthState;
use super::types::{ProfileResponse, SessionClaims};
use crate::signin;
use crate::store::UserStore;
use crate::types::User;

/// Create the Google sign-in router.
///
/// Mounts, under the configured auth path (default `/api/account`):
/// - `GET /login-google`: redirect to Google's consent screen
/// - `GET /google-response`: OAuth callback, signs the user in
/// - `GET /profile`: email and name of the signed-in user
pub fn auth_routes<S: UserStore>(config: AuthConfig, store: Arc<S>) -> Router {
    let auth_path = config.settings.auth_path.clone();

    let state = AuthState {
        client: Arc::new(config.client),
        store,
        settings: config.settings,
    };

    Router::new()
        .route(&format!("{auth_path}/login-google"), get(login::<S>))
        .route(&format!("{auth_path}/google-response"), get(callback::<S>))
        .route(&format!("{auth_path}/profile"), get(profile::<S>))
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<S: UserStore>(
    State(state): State<AuthState<S>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Response) {
    let auth_req = state.client.authorization_url();

    let (pkce_cookie, state_cookie) = cookies::pkce_cookies(
        &auth_req.code_verifier,
        &auth_req.state,
        state.settings.secure_cookies,
        &state.settings.auth_path,
    );

    (jar.add(pkce_cookie).add(state_cookie), found(&auth_req.url))
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback<S: UserStore>(
    State(state): State<AuthState<S>>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(PrivateCookieJar, Response), AuthError> {
    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(error = %error, description = %desc, "OAuth2 error from Google");
        return Err(AuthError::AuthenticationFailed);
    }

    let code = params.code.ok_or_else(|| {
        tracing::warn!("Callback without authorization code");
        AuthError::AuthenticationFailed
    })?;

    let stored_state = cookies::get_state(&jar);
    if params.state.is_none() || params.state != stored_state {
        tracing::warn!("OAuth state mismatch");
        return Err(AuthError::AuthenticationFailed);
    }

    let code_verifier = cookies::get_pkce_verifier(&jar).ok_or_else(|| {
        tracing::warn!("PKCE verifier cookie missing");
        AuthError::AuthenticationFailed
    })?;

    let claims = state
        .client
        .claims_for_code(&code, &code_verifier)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Google code exchange failed");
            AuthError::AuthenticationFailed
        })?;

    let user = signin::complete_sign_in(state.store.as_ref(), &claims)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Sign-in rejected"))?;

    let session = SessionClaims::for_user(&user, state.settings.session_ttl_days);
    let payload =
        serde_json::to_string(&session).map_err(|e| AuthError::Session(e.to_string()))?;

    let session_cookie = cookies::session_cookie(
        &state.settings.session_cookie_name,
        payload,
        state.settings.session_ttl_days,
        state.settings.secure_cookies,
    );

    let (clear_pkce, clear_state) = cookies::clear_pkce_cookies(&state.settings.auth_path);

    let jar = jar
        .add(session_cookie)
        .remove(clear_pkce)
        .remove(clear_state);

    tracing::info!(user_id = %user.id, "Google sign-in successful");

    Ok((jar, found(&profile_redirect(&state.settings, &user))))
}

// ── Profile ────────────────────────────────────────────────────────

async fn profile<S: UserStore>(
    State(state): State<AuthState<S>>,
    session: AuthSession,
) -> Result<Json<ProfileResponse>, AuthError> {
    let user = state
        .store
        .find_by_subject_id(&session.subject_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(
                subject_id = %session.subject_id,
                user_id = ?session.user_id,
                "Session for unknown user"
            );
            AuthError::Unauthorized
        })?;

    if session.user_id.as_ref().is_some_and(|id| *id != user.id) {
        tracing::debug!(user_id = %user.id, "Session was issued for a different user row");
    }

    Ok(Json(user.into()))
}

// ── Helpers ────────────────────────────────────────────────────────

/// `302 Found` to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Frontend profile route, optionally carrying email and name.
fn profile_redirect(settings: &AuthSettings, user: &User) -> String {
    let base = format!("{}/profile", settings.frontend_origin);
    if !settings.profile_in_redirect {
        return base;
    }
    format!(
        "{base}?email={}&name={}",
        urlencoding::encode(&user.email),
        urlencoding::encode(&user.display_name)
    )
}
