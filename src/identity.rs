//! Identity verification: turns the claims bundle Google hands back into a
//! typed identity.
//!
//! The claims bundle is whatever the userinfo endpoint returned after a
//! successful code exchange. Nothing in it is trusted to be present, so every
//! field is optional here and [`verify`] decides what is required.

use serde::{Deserialize, Serialize};

use crate::middleware::AuthError;
use crate::types::{NewUser, SubjectId};

/// Claims bundle from the Google OIDC userinfo endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
}

impl Claims {
    /// Claims carrying only a subject id.
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: Some(sub.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = Some(verified);
        self
    }
}

/// Identity extracted from a claims bundle.
///
/// The subject id is guaranteed; email and display name are not, because a
/// returning user can be found by subject id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject_id: SubjectId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl VerifiedIdentity {
    /// Profile fields needed to create a user on first sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingProfileFields`] if email or display name is absent.
    pub fn require_profile(&self) -> Result<NewUser, AuthError> {
        match (&self.email, &self.display_name) {
            (Some(email), Some(display_name)) => Ok(NewUser {
                subject_id: self.subject_id.clone(),
                email: email.clone(),
                display_name: display_name.clone(),
            }),
            _ => Err(AuthError::MissingProfileFields),
        }
    }
}

/// Extract the identity from a claims bundle.
///
/// Blank strings count as absent; other values are kept as sent.
///
/// # Errors
///
/// Returns [`AuthError::MissingSubjectId`] if `sub` is absent or blank.
pub fn verify(claims: &Claims) -> Result<VerifiedIdentity, AuthError> {
    let subject_id: SubjectId = claims
        .sub
        .as_deref()
        .ok_or(AuthError::MissingSubjectId)?
        .parse()?;

    Ok(VerifiedIdentity {
        subject_id,
        email: non_blank(claims.email.as_deref()),
        display_name: non_blank(claims.name.as_deref()),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
