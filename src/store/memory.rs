use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::Mutex;

use super::{StoreError, UserStore};
use crate::types::{NewUser, SubjectId, User};

/// In-process user store for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<SubjectId, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

impl UserStore for MemoryUserStore {
    async fn find_by_subject_id(&self, subject_id: &SubjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.get(subject_id).cloned())
    }

    async fn upsert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        let user = match users.entry(new_user.subject_id.clone()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(new_user.into_user()).clone(),
        };
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_user(sub: &str, email: &str, name: &str) -> NewUser {
        NewUser {
            subject_id: sub.parse().unwrap(),
            email: email.into(),
            display_name: name.into(),
        }
    }

    #[tokio::test]
    async fn upsert_then_find() {
        let store = MemoryUserStore::new();
        let created = store.upsert(new_user("g-123", "a@x.com", "Alice")).await.unwrap();

        let found = store
            .find_by_subject_id(&"g-123".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
        assert_eq!(found.subject_id.as_str(), "g-123");
    }

    #[tokio::test]
    async fn find_unknown_is_none() {
        let store = MemoryUserStore::new();
        let found = store.find_by_subject_id(&"nobody".parse().unwrap()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn upsert_is_first_write_wins() {
        let store = MemoryUserStore::new();
        let first = store.upsert(new_user("g-123", "a@x.com", "Alice")).await.unwrap();
        let second = store.upsert(new_user("g-123", "a2@x.com", "Alicia")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.email, "a@x.com");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_upserts_create_one_user() {
        let store = Arc::new(MemoryUserStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert(new_user("g-race", &format!("u{i}@x.com"), "Racer"))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.len().await, 1);
    }
}
