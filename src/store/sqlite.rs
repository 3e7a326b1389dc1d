use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{StoreError, UserStore};
use crate::config::StoreConfig;
use crate::types::{NewUser, SubjectId, User, UserId};

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id        TEXT PRIMARY KEY NOT NULL,
    google_id TEXT NOT NULL UNIQUE,
    email     TEXT NOT NULL,
    name      TEXT NOT NULL
)";

const SELECT_BY_GOOGLE_ID: &str = "SELECT id, google_id, email, name FROM users WHERE google_id = ?";

// The unique index on google_id arbitrates concurrent first sign-ins.
const INSERT_IF_ABSENT: &str = "INSERT INTO users (id, google_id, email, name) VALUES (?, ?, ?, ?)
    ON CONFLICT(google_id) DO NOTHING";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    google_id: String,
    email: String,
    name: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let subject_id = SubjectId::try_from(row.google_id).map_err(|_| {
            StoreError::Unavailable(format!("user {} has an empty google_id", row.id))
        })?;
        Ok(Self {
            id: UserId(row.id),
            subject_id,
            email: row.email,
            display_name: row.name,
        })
    }
}

/// SQLite-backed user store (`users` table).
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteUserStore {
    /// Open (creating if missing) the database and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid, the database
    /// cannot be opened, or the migration fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid database url: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.timeout)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("connect: {e}")))?;

        let store = Self::from_pool(pool, config.timeout);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool. The schema is not applied; call [`migrate`](Self::migrate).
    #[must_use]
    pub fn from_pool(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on database failure or timeout.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        self.bounded("migrate", sqlx::query(CREATE_USERS).execute(&self.pool))
            .await?;
        Ok(())
    }

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on database failure or timeout.
    pub async fn count(&self) -> Result<i64, StoreError> {
        self.bounded(
            "count",
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool),
        )
        .await
    }

    async fn bounded<T, F>(&self, operation: &'static str, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, operation, "User store query failed");
                Err(StoreError::Unavailable(format!("{operation}: {e}")))
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "User store query timed out"
                );
                Err(StoreError::Unavailable(format!(
                    "{operation} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

impl UserStore for SqliteUserStore {
    async fn find_by_subject_id(&self, subject_id: &SubjectId) -> Result<Option<User>, StoreError> {
        let row = self
            .bounded(
                "find_by_subject_id",
                sqlx::query_as::<_, UserRow>(SELECT_BY_GOOGLE_ID)
                    .bind(subject_id.as_str())
                    .fetch_optional(&self.pool),
            )
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn upsert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let candidate = new_user.into_user();

        let inserted = self
            .bounded(
                "upsert",
                sqlx::query(INSERT_IF_ABSENT)
                    .bind(candidate.id.0.as_str())
                    .bind(candidate.subject_id.as_str())
                    .bind(candidate.email.as_str())
                    .bind(candidate.display_name.as_str())
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        if inserted == 1 {
            tracing::debug!(user_id = %candidate.id, "Inserted user");
            return Ok(candidate);
        }

        self.find_by_subject_id(&candidate.subject_id)
            .await?
            .ok_or_else(|| {
                StoreError::Unavailable(format!(
                    "user {} conflicted on insert but was not found",
                    candidate.subject_id
                ))
            })
    }
}
