//! Application error types

use relay_domain::{DomainError, ResponseSpec};
use thiserror::Error;

use crate::ports::HttpClientError;

/// Why a refresh cycle could not produce a new credential.
///
/// Cloned into every request parked on the failed cycle, so all of them
/// see the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token was stored.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a failure status.
    #[error("refresh rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status of the refresh response.
        status: u16,
        /// Backend message, if any.
        message: String,
    },

    /// The refresh call did not finish in time.
    #[error("refresh timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The refresh endpoint could not be reached.
    #[error("refresh request failed: {0}")]
    Network(String),

    /// The refresh response could not be understood.
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The new credential could not be persisted.
    #[error("failed to store refreshed credential: {0}")]
    Storage(String),

    /// The refresh cycle ended without reporting an outcome.
    #[error("refresh cycle abandoned")]
    Abandoned,
}

/// Failures surfaced by `Dispatcher::send`.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The request was rejected as unauthorized even after one replay with
    /// a fresh credential.
    #[error("unauthorized: {}", .0.status)]
    Unauthorized(Box<ResponseSpec>),

    /// The credential could not be refreshed; the session has been ended.
    #[error("session expired: {0}")]
    RefreshFailed(#[from] RefreshError),

    /// Transport failure; not retried by the dispatcher.
    #[error("network error: {0}")]
    Network(#[from] HttpClientError),

    /// The request was malformed and never sent.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),
}

impl DispatchError {
    /// Returns true if the caller should present a re-authentication flow.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for dispatched requests.
pub type DispatchResult = Result<ResponseSpec, DispatchError>;
