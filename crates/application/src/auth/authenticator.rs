//! Sign-in, sign-up, session restore and logout.

use std::sync::Arc;

use relay_domain::{AuthGrant, RequestSpec, SessionUser, UserRole};
use tracing::{info, warn};

use super::AuthError;
use crate::dispatcher::Dispatcher;
use crate::ports::{AuthGateway, CredentialStore, HttpClient};

/// Use case owning the credential lifecycle outside of refresh.
///
/// Grants from the auth endpoints are written to the same credential
/// store the dispatcher reads, so requests sent after a login carry the
/// new access token.
pub struct Authenticator<C: HttpClient + 'static> {
    gateway: Arc<dyn AuthGateway>,
    dispatcher: Dispatcher<C>,
    current_user_path: String,
}

impl<C: HttpClient + 'static> Authenticator<C> {
    /// Creates an authenticator sharing `dispatcher`'s credential store.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        dispatcher: Dispatcher<C>,
        current_user_path: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            dispatcher,
            current_user_path: current_user_path.into(),
        }
    }

    fn store(&self) -> &Arc<dyn CredentialStore> {
        self.dispatcher.credential_store()
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    /// Returns `AuthError` if the backend rejects the login or the
    /// credential cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let grant = self.gateway.login(email, password).await?;
        self.accept(grant).await
    }

    /// Signs in to an administrator account.
    ///
    /// # Errors
    /// Same as [`Self::login`].
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let grant = self.gateway.admin_login(email, password).await?;
        self.accept(grant).await
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    /// Same as [`Self::login`].
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<SessionUser, AuthError> {
        let grant = self.gateway.signup(email, password, role).await?;
        self.accept(grant).await
    }

    /// Completes a Google sign-in with the authorization code.
    ///
    /// # Errors
    /// Same as [`Self::login`].
    pub async fn google_auth(
        &self,
        code: &str,
        role: Option<UserRole>,
    ) -> Result<SessionUser, AuthError> {
        let grant = self.gateway.google_auth(code, role).await?;
        self.accept(grant).await
    }

    /// Fetches the signed-in user through the dispatcher.
    ///
    /// # Errors
    /// Returns `AuthError::Dispatch` if the request fails (including an
    /// ended session), or `AuthError::Rejected` for a non-2xx answer.
    pub async fn current_user(&self) -> Result<SessionUser, AuthError> {
        let response = self
            .dispatcher
            .send(RequestSpec::get(self.current_user_path.as_str()))
            .await?;

        if !response.is_success() {
            return Err(AuthError::rejected(&response, "Failed to fetch user"));
        }

        response
            .json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    /// Resumes a persisted session.
    ///
    /// Returns `None` when nothing is stored, or when the stored
    /// credential no longer yields a user; in that case it is cleared.
    pub async fn restore(&self) -> Option<SessionUser> {
        self.store().get().await?;

        match self.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "session restored");
                Some(user)
            }
            Err(error) => {
                warn!(%error, "stored session is no longer valid");
                self.store().clear().await;
                None
            }
        }
    }

    /// Ends the session. Safe to call any number of times.
    pub async fn logout(&self) {
        self.store().clear().await;
        info!("signed out");
    }

    async fn accept(&self, grant: AuthGrant) -> Result<SessionUser, AuthError> {
        self.store().set(grant.credential).await?;
        info!(user_id = %grant.user.id, role = %grant.user.role, "signed in");
        Ok(grant.user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;
    use crate::error::RefreshError;
    use crate::ports::{HttpClientError, SessionListener, TokenRefresher};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use relay_domain::{AUTHORIZATION, Credential, ResponseSpec};

    struct FakeGateway;

    fn grant(email: &str, role: UserRole, token: &str) -> AuthGrant {
        AuthGrant {
            user: SessionUser {
                id: "1".to_string(),
                email: email.to_string(),
                role,
            },
            credential: Credential::new(token, format!("refresh-{token}")),
        }
    }

    #[async_trait]
    impl AuthGateway for FakeGateway {
        async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
            if password == "secret" {
                Ok(grant(email, UserRole::Brand, "A1"))
            } else {
                Err(AuthError::Rejected {
                    status: 401,
                    message: "Incorrect email or password".to_string(),
                })
            }
        }

        async fn admin_login(&self, email: &str, _password: &str) -> Result<AuthGrant, AuthError> {
            Ok(grant(email, UserRole::Admin, "A-admin"))
        }

        async fn signup(
            &self,
            email: &str,
            _password: &str,
            role: UserRole,
        ) -> Result<AuthGrant, AuthError> {
            Ok(grant(email, role, "A-new"))
        }

        async fn google_auth(
            &self,
            _code: &str,
            role: Option<UserRole>,
        ) -> Result<AuthGrant, AuthError> {
            Ok(grant("g@example.com", role.unwrap_or(UserRole::Influencer), "A-google"))
        }
    }

    /// Answers `/auth/me` for "A1" only.
    struct MeEndpoint;

    impl HttpClient for MeEndpoint {
        async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
            if request.headers.get(AUTHORIZATION) == Some("Bearer A1") {
                Ok(ResponseSpec::with_status(
                    200,
                    r#"{"user_id":"1","email":"brand@demo.com","role":"BRAND"}"#,
                ))
            } else {
                Ok(ResponseSpec::with_status(401, r#"{"detail":"Not authenticated"}"#))
            }
        }
    }

    struct NoRefresh;

    #[async_trait]
    impl TokenRefresher for NoRefresh {
        async fn refresh(&self, _refresh_token: &str) -> Result<Credential, RefreshError> {
            Err(RefreshError::Rejected {
                status: 401,
                message: "expired".to_string(),
            })
        }
    }

    struct Quiet;

    impl SessionListener for Quiet {
        fn session_expired(&self, _reason: &RefreshError) {}
    }

    fn authenticator(store: MemoryCredentialStore) -> Authenticator<MeEndpoint> {
        let dispatcher = Dispatcher::new(
            MeEndpoint,
            Arc::new(store),
            Arc::new(NoRefresh),
            Arc::new(Quiet),
        );
        Authenticator::new(Arc::new(FakeGateway), dispatcher, "/auth/me")
    }

    #[tokio::test]
    async fn test_login_stores_credential() {
        let store = MemoryCredentialStore::new();
        let auth = authenticator(store.clone());

        let user = auth.login("brand@demo.com", "secret").await.unwrap();

        assert_eq!(user.role, UserRole::Brand);
        assert_eq!(store.get().await, Some(Credential::new("A1", "refresh-A1")));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_store_untouched() {
        let store = MemoryCredentialStore::new();
        let auth = authenticator(store.clone());

        let err = auth.login("brand@demo.com", "wrong").await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_signup_and_google_use_requested_role() {
        let auth = authenticator(MemoryCredentialStore::new());

        let user = auth
            .signup("new@example.com", "pw", UserRole::Influencer)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Influencer);

        let user = auth.google_auth("code", Some(UserRole::Brand)).await.unwrap();
        assert_eq!(user.role, UserRole::Brand);

        let admin = auth.admin_login("admin@demo.com", "pw").await.unwrap();
        assert_eq!(admin.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_restore_with_valid_session() {
        let store = MemoryCredentialStore::with_credential(Credential::new("A1", "R1"));
        let auth = authenticator(store);

        let user = auth.restore().await.expect("session should restore");
        assert_eq!(user.email, "brand@demo.com");
    }

    #[tokio::test]
    async fn test_restore_without_credential() {
        let auth = authenticator(MemoryCredentialStore::new());
        assert!(auth.restore().await.is_none());
    }

    #[tokio::test]
    async fn test_restore_with_dead_session_clears_store() {
        let store = MemoryCredentialStore::with_credential(Credential::new("stale", "R-stale"));
        let auth = authenticator(store.clone());

        assert!(auth.restore().await.is_none());
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_twice() {
        let store = MemoryCredentialStore::with_credential(Credential::new("A1", "R1"));
        let auth = authenticator(store.clone());

        auth.logout().await;
        auth.logout().await;

        assert!(store.get().await.is_none());
    }
}
