//! Refresh endpoint port

use async_trait::async_trait;
use relay_domain::Credential;

use crate::error::RefreshError;

/// The backend's refresh endpoint.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges a refresh token for a new credential pair.
    ///
    /// # Errors
    /// Returns `RefreshError` if the endpoint is unreachable, rejects the
    /// token, or answers with something that is not a token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<Credential, RefreshError>;
}
