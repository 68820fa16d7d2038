//! Authentication endpoints port

use async_trait::async_trait;
use relay_domain::{AuthGrant, UserRole};

use crate::auth::AuthError;

/// Backend endpoints that issue a credential pair from user input.
///
/// These calls are unauthenticated and therefore bypass the dispatcher.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Password login.
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError>;

    /// Administrator password login.
    async fn admin_login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError>;

    /// Creates an account and signs it in.
    async fn signup(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<AuthGrant, AuthError>;

    /// Exchanges a Google OAuth authorization code.
    async fn google_auth(&self, code: &str, role: Option<UserRole>)
    -> Result<AuthGrant, AuthError>;
}
