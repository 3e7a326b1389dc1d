//! Google sign-in routes and session handling for Axum.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use google_signin::middleware::{AuthConfig, auth_routes};
//! use google_signin::store::MemoryUserStore;
//!
//! // 1. Configure from environment
//! let config = AuthConfig::from_env()?;
//!
//! // 2. Mount auth routes with a user store
//! let app = axum::Router::new()
//!     .merge(auth_routes(config, Arc::new(MemoryUserStore::new())));
//! ```
//!
//! Routes are `login-google`, `google-response` and `profile` under the auth
//! path (default `/api/account`).

mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;
mod types;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractor::AuthSession;
pub use routes::auth_routes;
pub use state::AuthState;
pub use types::{ProfileResponse, SessionClaims};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
