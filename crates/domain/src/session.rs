//! Authenticated user session types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::{DomainError, DomainResult};

/// Role assigned to an account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Content creator account.
    Influencer,
    /// Company account running campaigns.
    Brand,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Returns the backend's wire name for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Influencer => "INFLUENCER",
            Self::Brand => "BRAND",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INFLUENCER" => Ok(Self::Influencer),
            "BRAND" => Ok(Self::Brand),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(DomainError::UnknownRole(s.to_string())),
        }
    }
}

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend user id.
    #[serde(rename = "user_id")]
    pub id: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: UserRole,
}

/// What the backend hands out on login, signup or Google sign-in: the user
/// plus a fresh credential pair, as one flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    /// The authenticated user.
    #[serde(flatten)]
    pub user: SessionUser,
    /// Tokens to persist in the credential store.
    #[serde(flatten)]
    pub credential: Credential,
}

/// A client-side navigation requested by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Route to navigate to (e.g. `/signin`).
    pub route: String,
    /// Why the navigation happened.
    pub reason: String,
}
