//! Backend authentication endpoints over HTTP.
//!
//! Implements both the refresh endpoint used by the dispatcher and the
//! credential-issuing endpoints (login, admin login, signup, Google).
//! None of these calls carries an `Authorization` header, so they go
//! straight to reqwest instead of through the dispatcher.

use async_trait::async_trait;
use relay_application::ports::{AuthGateway, HttpClientError, TokenRefresher};
use relay_application::{AuthError, RefreshError};
use relay_domain::{AuthGrant, ClientSettings, Credential, ResponseSpec, UserRole, token_preview};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::ReqwestHttpClient;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Token pair returned by the refresh endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: UserRole,
}

#[derive(Debug, Serialize)]
struct GoogleAuthRequest<'a> {
    code: &'a str,
    role: Option<UserRole>,
}

/// A non-2xx answer, with its body kept for the error message.
struct Refusal {
    status: u16,
    message: Option<String>,
}

/// HTTP client for the backend's `/auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    http_client: reqwest::Client,
    settings: ClientSettings,
}

impl HttpAuthClient {
    /// Creates a client for the backend described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new(settings: ClientSettings) -> Result<Self, HttpClientError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn transport_error(&self, error: &reqwest::Error) -> HttpClientError {
        ReqwestHttpClient::map_error(error, self.settings.request_timeout_ms)
    }

    /// POSTs a JSON body. `Ok(Err(_))` is a non-2xx answer.
    async fn post_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Result<reqwest::Response, Refusal>, HttpClientError> {
        let url = self
            .settings
            .endpoint(path)
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;

        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        Ok(Self::check(response).await)
    }

    /// POSTs the `username`/`password` form the login endpoints expect.
    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Result<reqwest::Response, Refusal>, HttpClientError> {
        let url = self
            .settings
            .endpoint(path)
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;

        let params = [("username", email), ("password", password)];
        let body = serde_urlencoded::to_string(params)
            .map_err(|e| HttpClientError::InvalidBody(format!("Failed to encode form: {e}")))?;

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        Ok(Self::check(response).await)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, Refusal> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(Refusal {
            status: status.as_u16(),
            message: ResponseSpec::with_status(status.as_u16(), body.to_vec()).error_detail(),
        })
    }

    async fn grant(
        outcome: Result<Result<reqwest::Response, Refusal>, HttpClientError>,
        fallback: &str,
    ) -> Result<AuthGrant, AuthError> {
        let response = outcome?.map_err(|refusal| AuthError::Rejected {
            status: refusal.status,
            message: refusal.message.unwrap_or_else(|| fallback.to_string()),
        })?;

        response
            .json::<AuthGrant>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TokenRefresher for HttpAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<Credential, RefreshError> {
        debug!(
            refresh_token = %token_preview(refresh_token),
            "calling refresh endpoint"
        );

        let response = self
            .post_json(&self.settings.refresh_path, &RefreshRequest { refresh_token })
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?
            .map_err(|refusal| {
                warn!(status = refusal.status, "refresh endpoint refused the token");
                RefreshError::Rejected {
                    status: refusal.status,
                    message: refusal
                        .message
                        .unwrap_or_else(|| "Token refresh failed".to_string()),
                }
            })?;

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            RefreshError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })?;

        Ok(Credential::new(tokens.access_token, tokens.refresh_token))
    }
}

#[async_trait]
impl AuthGateway for HttpAuthClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let outcome = self
            .post_credentials(&self.settings.login_path, email, password)
            .await;
        Self::grant(outcome, "Login failed").await
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let outcome = self
            .post_credentials(&self.settings.admin_login_path, email, password)
            .await;
        Self::grant(outcome, "Admin login failed").await
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<AuthGrant, AuthError> {
        let body = SignupRequest {
            email,
            password,
            role,
        };
        let outcome = self.post_json(&self.settings.signup_path, &body).await;
        Self::grant(outcome, "Signup failed").await
    }

    async fn google_auth(
        &self,
        code: &str,
        role: Option<UserRole>,
    ) -> Result<AuthGrant, AuthError> {
        let body = GoogleAuthRequest { code, role };
        let outcome = self.post_json(&self.settings.google_auth_path, &body).await;
        Self::grant(outcome, "Google authentication failed").await
    }
}
