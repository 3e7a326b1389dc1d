use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::middleware::AuthError;

/// Google subject identifier (OIDC `sub` claim).
///
/// Stable and unique per Google account. This is the only key used to find a
/// local user; email and name may change on Google's side, the `sub` never does.
///
/// Never empty or all whitespace; otherwise kept exactly as Google sent it.
/// Use `"1234".parse::<SubjectId>()` or `SubjectId::try_from(string)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for SubjectId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for SubjectId {
    type Error = AuthError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().is_empty() {
            Err(AuthError::MissingSubjectId)
        } else {
            Ok(Self(s))
        }
    }
}

impl From<SubjectId> for String {
    fn from(s: SubjectId) -> Self {
        s.0
    }
}

/// Store-assigned user identifier (ULID string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Fresh identifier for a user row about to be inserted.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

/// A locally persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub subject_id: SubjectId,
    pub email: String,
    pub display_name: String,
}

/// Fields required to create a user on first sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub subject_id: SubjectId,
    pub email: String,
    pub display_name: String,
}

impl NewUser {
    /// Materialize the row with a freshly generated id.
    pub(crate) fn into_user(self) -> User {
        User {
            id: UserId::generate(),
            subject_id: self.subject_id,
            email: self.email,
            display_name: self.display_name,
        }
    }
}
