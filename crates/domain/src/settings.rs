//! Client settings domain model
//!
//! Where the backend lives, which routes the session layer uses, and the
//! timeouts applied to outbound calls.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Settings for one dispatcher and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Refresh endpoint path.
    pub refresh_path: String,
    /// Password login endpoint path.
    pub login_path: String,
    /// Administrator login endpoint path.
    pub admin_login_path: String,
    /// Signup endpoint path.
    pub signup_path: String,
    /// Google OAuth code exchange endpoint path.
    pub google_auth_path: String,
    /// Current-user endpoint path.
    pub current_user_path: String,
    /// Client route that forced logouts navigate to.
    pub sign_in_route: String,
    /// Timeout applied to each resource request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Upper bound on one refresh call, in milliseconds.
    pub refresh_timeout_ms: u64,
    /// Where the credential pair is persisted. `None` picks the platform
    /// data directory.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            login_path: "/auth/login".to_string(),
            admin_login_path: "/auth/admin/login".to_string(),
            signup_path: "/auth/signup".to_string(),
            google_auth_path: "/auth/google".to_string(),
            current_user_path: "/auth/me".to_string(),
            sign_in_route: "/signin".to_string(),
            request_timeout_ms: 30_000,
            refresh_timeout_ms: 10_000,
            credentials_path: None,
        }
    }
}

impl ClientSettings {
    /// Creates default settings pointing at another backend.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves a path against the base URL.
    ///
    /// The base may itself carry a path prefix (`/api`), which is kept.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the result does not parse.
    pub fn endpoint(&self, path: &str) -> DomainResult<Url> {
        let base = self.base_url.trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Refresh timeout as a `Duration`.
    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// Checks that the base URL is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn validate(&self) -> DomainResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(DomainError::InvalidUrl(format!(
                "unsupported scheme {other}: {}",
                self.base_url
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let settings = ClientSettings::default();
        let url = settings.endpoint("/auth/refresh").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/auth/refresh");
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let settings = ClientSettings::with_base_url("https://api.example.com/v1/");
        let url = settings.endpoint("campaigns").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/campaigns");
    }

    #[test]
    fn test_validate_base_url() {
        assert!(ClientSettings::default().validate().is_ok());
        assert!(ClientSettings::with_base_url("ftp://x").validate().is_err());
        assert!(ClientSettings::with_base_url("not a url").validate().is_err());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"base_url":"https://b.example","refresh_timeout_ms":500}"#)
                .unwrap();
        assert_eq!(settings.refresh_timeout(), Duration::from_millis(500));
        assert_eq!(settings.refresh_path, "/auth/refresh");
    }
}
