#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod oauth;
pub mod pkce;
pub mod signin;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::{ServerConfig, StoreConfig};
pub use error::Error;
pub use identity::{Claims, VerifiedIdentity, verify};
pub use middleware::{AuthConfig, AuthError, AuthSession, auth_routes};
pub use oauth::{AuthorizationRequest, GoogleClient, GoogleConfig, TokenResponse};
pub use signin::complete_sign_in;
#[cfg(feature = "sqlite")]
pub use store::SqliteUserStore;
pub use store::{MemoryUserStore, StoreError, UserStore};
pub use types::{NewUser, SubjectId, User, UserId};
