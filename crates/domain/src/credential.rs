//! Access/refresh credential pair.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheme used when attaching the access token to a request.
pub const BEARER_SCHEME: &str = "Bearer";

/// The token pair issued by the backend on login, signup or refresh.
///
/// Both halves always travel together: a store either holds a complete
/// pair or nothing at all.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived token attached to every authorized request.
    pub access_token: String,
    /// Longer-lived token used solely to obtain a new access token.
    pub refresh_token: String,
}

impl Credential {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns the `Authorization` header value for this credential.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        bearer(&self.access_token)
    }

    /// Returns true if the refresh half is usable.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Formats a bearer `Authorization` header value.
#[must_use]
pub fn bearer(access_token: &str) -> String {
    format!("{BEARER_SCHEME} {access_token}")
}

/// Get a preview of a token (first 8 chars + ...), safe to log.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        token.to_string()
    }
}
