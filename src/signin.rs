//! Find-or-create for a verified Google sign-in.

use crate::identity::{self, Claims};
use crate::middleware::AuthError;
use crate::store::UserStore;
use crate::types::User;

/// Resolve the local user for a claims bundle, creating it on first sign-in.
///
/// A returning user is found by subject id alone, so email and name are only
/// required when no user exists yet. Existing users are returned as stored.
///
/// # Errors
///
/// - [`AuthError::MissingSubjectId`] if the claims carry no subject id
/// - [`AuthError::MissingProfileFields`] on first sign-in without email or name
/// - [`AuthError::StoreUnavailable`] if the store fails
pub async fn complete_sign_in<S: UserStore>(
    store: &S,
    claims: &Claims,
) -> Result<User, AuthError> {
    let identity = identity::verify(claims)?;

    if let Some(user) = store.find_by_subject_id(&identity.subject_id).await? {
        tracing::debug!(user_id = %user.id, "Returning user");
        return Ok(user);
    }

    let new_user = identity.require_profile()?;
    let user = store.upsert(new_user).await?;
    tracing::info!(user_id = %user.id, "Created user on first sign-in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryUserStore;

    fn alice() -> Claims {
        Claims::new("g-123").with_email("a@x.com").with_name("Alice")
    }

    #[tokio::test]
    async fn first_sign_in_creates_one_user() {
        let store = MemoryUserStore::new();
        let user = complete_sign_in(&store, &alice()).await.unwrap();

        assert_eq!(user.subject_id.as_str(), "g-123");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(store.len().await, 1);

        let again = complete_sign_in(&store, &alice()).await.unwrap();
        assert_eq!(again, user);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn returning_user_keeps_stored_profile() {
        let store = MemoryUserStore::new();
        complete_sign_in(&store, &alice()).await.unwrap();

        let changed = Claims::new("g-123").with_email("a2@x.com").with_name("Alice");
        let user = complete_sign_in(&store, &changed).await.unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn returning_user_needs_only_subject() {
        let store = MemoryUserStore::new();
        let created = complete_sign_in(&store, &alice()).await.unwrap();

        let user = complete_sign_in(&store, &Claims::new("g-123")).await.unwrap();
        assert_eq!(user, created);
    }

    #[tokio::test]
    async fn missing_subject_creates_nothing() {
        let store = MemoryUserStore::new();
        let claims = Claims::default().with_email("a@x.com").with_name("Alice");

        let err = complete_sign_in(&store, &claims).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingSubjectId));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn first_sign_in_without_profile_creates_nothing() {
        let store = MemoryUserStore::new();

        let err = complete_sign_in(&store, &Claims::new("g-9").with_email("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingProfileFields));

        let err = complete_sign_in(&store, &Claims::new("g-9").with_name("Bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingProfileFields));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_first_sign_ins_create_one_user() {
        let store = Arc::new(MemoryUserStore::new());
        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                complete_sign_in(store.as_ref(), &alice()).await.unwrap()
            }));
        }

        let mut users = Vec::new();
        for handle in handles {
            users.push(handle.await.unwrap());
        }
        assert!(users.iter().all(|u| u.id == users[0].id));
        assert_eq!(store.len().await, 1);
    }
}
