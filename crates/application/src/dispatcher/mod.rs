//! Authenticated request dispatcher
//!
//! Every authorized backend call goes through [`Dispatcher::send`]. The
//! dispatcher attaches the stored access token, and when the backend
//! answers 401 it refreshes the credential once for the whole burst of
//! failing requests, then replays each of them with the new token.

mod coordinator;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use relay_domain::{Credential, RefreshState, RequestSpec, token_preview};
use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult, RefreshError};
use crate::ports::{CredentialStore, HttpClient, SessionListener, TokenRefresher};

use coordinator::{Admission, RefreshCoordinator};

/// Default upper bound on one refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Request dispatcher with single-flight token refresh and replay.
///
/// Cloning is cheap and clones share the refresh state, so one cycle
/// covers every clone. Separately constructed dispatchers never interfere.
///
/// # Example
///
/// ```ignore
/// let dispatcher = Dispatcher::new(client, store, refresher, listener);
/// let response = dispatcher.send(RequestSpec::get("/campaigns")).await?;
/// ```
pub struct Dispatcher<C: HttpClient + 'static> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    client: C,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    listener: Arc<dyn SessionListener>,
    coordinator: RefreshCoordinator,
    refresh_timeout: Duration,
}

impl<C: HttpClient + 'static> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: HttpClient + 'static> Dispatcher<C> {
    /// Creates a dispatcher with its own, idle refresh state.
    pub fn new(
        client: C,
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        listener: Arc<dyn SessionListener>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                store,
                refresher,
                listener,
                coordinator: RefreshCoordinator::new(),
                refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            }),
        }
    }

    /// Sets the upper bound on one refresh call.
    ///
    /// Has no effect once the dispatcher has been cloned.
    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.refresh_timeout = timeout;
        }
        self
    }

    /// Returns whether a refresh cycle is in flight.
    #[must_use]
    pub fn refresh_state(&self) -> RefreshState {
        self.inner.coordinator.refresh_state()
    }

    /// Number of requests waiting on the current refresh cycle.
    #[must_use]
    pub fn parked_requests(&self) -> usize {
        self.inner.coordinator.parked()
    }

    /// The credential store this dispatcher reads from.
    #[must_use]
    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Sends a request with the current credential.
    ///
    /// Non-401 responses come back unchanged, whatever their status. A 401
    /// leads to at most one refresh cycle and one replay.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the replay was rejected as well
    /// - `RefreshFailed` if the credential could not be refreshed; the
    ///   store has been cleared and the session listener notified
    /// - `Network` on transport failure, never retried here
    /// - `InvalidRequest` if the request is malformed
    pub async fn send(&self, request: RequestSpec) -> DispatchResult {
        request.validate()?;

        let epoch = self.inner.coordinator.epoch();
        let token = self.inner.access_token().await;
        let response = self.inner.client.execute(&request.authorized(token.as_deref())).await?;

        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            "request unauthorized"
        );

        match self.inner.coordinator.admit(epoch, request) {
            Admission::Replay(request) => {
                debug!(request_id = %request.id, "credential changed in flight; replaying");
                let token = self.inner.access_token().await;
                self.inner.replay(&request, token.as_deref()).await
            }
            Admission::Trigger(receiver) => {
                tokio::spawn(Arc::clone(&self.inner).run_refresh_cycle());
                receiver.await.unwrap_or_else(|_| Err(RefreshError::Abandoned.into()))
            }
            Admission::Parked(receiver) => {
                receiver.await.unwrap_or_else(|_| Err(RefreshError::Abandoned.into()))
            }
        }
    }
}

impl<C: HttpClient> Inner<C> {
    async fn access_token(&self) -> Option<String> {
        self.store
            .get()
            .await
            .map(|c| c.access_token)
            .filter(|token| !token.is_empty())
    }

    /// Resends a request once. Its retry is spent, so a second 401 is final.
    async fn replay(&self, request: &RequestSpec, access_token: Option<&str>) -> DispatchResult {
        let response = self.client.execute(&request.authorized(access_token)).await?;
        if response.is_unauthorized() {
            debug!(request_id = %request.id, "replay unauthorized; giving up");
            return Err(DispatchError::Unauthorized(Box::new(response)));
        }
        Ok(response)
    }

    /// Runs one refresh cycle to completion and drains every request
    /// parked on it.
    ///
    /// Runs detached from the triggering caller so that dropping that
    /// caller's future cannot strand the others. If the task unwinds, the
    /// cycle guard rejects the batch as abandoned.
    async fn run_refresh_cycle(self: Arc<Self>) {
        info!("access token rejected; refreshing credential");
        let mut cycle = self.coordinator.cycle();

        match self.refresh_credential().await {
            Ok(credential) => {
                let batch = cycle.finish(true);
                info!(
                    parked = batch.len(),
                    access_token = %token_preview(&credential.access_token),
                    "credential refreshed; replaying parked requests"
                );
                let this = &*self;
                let token = credential.access_token.as_str();
                join_all(batch.into_iter().map(|pending| async move {
                    let outcome = this.replay(&pending.request, Some(token)).await;
                    pending.resolve(outcome);
                }))
                .await;
            }
            Err(error) => {
                self.store.clear().await;
                let batch = cycle.finish(false);
                warn!(%error, parked = batch.len(), "credential refresh failed; ending session");
                self.listener.session_expired(&error);
                for pending in batch {
                    pending.reject(error.clone());
                }
            }
        }
    }

    async fn refresh_credential(&self) -> Result<Credential, RefreshError> {
        let refresh_token = self
            .store
            .get()
            .await
            .filter(Credential::can_refresh)
            .map(|c| c.refresh_token)
            .ok_or(RefreshError::MissingRefreshToken)?;

        let timeout_ms = u64::try_from(self.refresh_timeout.as_millis()).unwrap_or(u64::MAX);
        let credential =
            tokio::time::timeout(self.refresh_timeout, self.refresher.refresh(&refresh_token))
                .await
                .map_err(|_| RefreshError::Timeout { timeout_ms })??;

        self.store
            .set(credential.clone())
            .await
            .map_err(|e| RefreshError::Storage(e.to_string()))?;

        Ok(credential)
    }
}
