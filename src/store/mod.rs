//! Local user persistence keyed by Google subject id.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::future::Future;

pub use memory::MemoryUserStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteUserStore;

use crate::types::{NewUser, SubjectId, User};

/// User store failure. Always transient from the caller's point of view.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// User persistence used by the sign-in flow and the profile endpoint.
///
/// # Contract
///
/// - `find_by_subject_id` has no side effects.
/// - `upsert` is first-write-wins: if a user with the subject id exists it is
///   returned unchanged, even when `new_user` carries a different email or name.
/// - Concurrent `upsert` calls for the same subject id produce exactly one row;
///   every caller gets that row back.
pub trait UserStore: Send + Sync + 'static {
    /// Look up a user by Google subject id.
    fn find_by_subject_id(
        &self,
        subject_id: &SubjectId,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Insert the user unless one already exists for its subject id.
    fn upsert(&self, new_user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;
}
