use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{SubjectId, User, UserId};

/// Principal stored in the encrypted session cookie.
///
/// `sub` is optional on the wire so a cookie written without it is still
/// readable and can be rejected with a precise error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub sub: Option<SubjectId>,
    #[serde(default)]
    pub uid: Option<UserId>,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for a freshly signed-in user.
    #[must_use]
    pub fn for_user(user: &User, ttl_days: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: Some(user.subject_id.clone()),
            uid: Some(user.id.clone()),
            iat: now,
            exp: now + ttl_days * 24 * 60 * 60,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() >= self.exp
    }
}

/// Body of `GET {auth_path}/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: UserId("01HZX".into()),
            subject_id: "g-123".parse().unwrap(),
            email: "a@x.com".into(),
            display_name: "Alice".into(),
        }
    }

    #[test]
    fn fresh_claims_are_live() {
        let claims = SessionClaims::for_user(&alice(), 14);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 14 * 86_400);
        assert_eq!(claims.sub.as_ref().map(SubjectId::as_str), Some("g-123"));
    }

    #[test]
    fn past_expiry_is_expired() {
        let mut claims = SessionClaims::for_user(&alice(), 1);
        claims.exp = claims.iat - 1;
        assert!(claims.is_expired());
    }

    #[test]
    fn cookie_without_sub_still_parses() {
        let claims: SessionClaims = serde_json::from_str(r#"{"iat":1,"exp":2}"#).unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.uid.is_none());
    }

    #[test]
    fn profile_json_shape() {
        let json = serde_json::to_value(ProfileResponse::from(alice())).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "a@x.com", "name": "Alice" }));
    }
}
