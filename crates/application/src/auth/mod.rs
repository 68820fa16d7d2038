//! Authentication module.
//!
//! This module provides:
//! - In-memory credential storage
//! - The authenticator use case (login, signup, restore, logout)

mod authenticator;
mod token_store;

pub use authenticator::Authenticator;
pub use token_store::MemoryCredentialStore;

use relay_domain::ResponseSpec;
use thiserror::Error;

use crate::error::DispatchError;
use crate::ports::{CredentialStoreError, HttpClientError};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend refused the request.
    #[error("{message}")]
    Rejected {
        /// HTTP status of the answer.
        status: u16,
        /// The backend's `detail` message, or a generic one.
        message: String,
    },

    /// The auth endpoint could not be reached.
    #[error("network error: {0}")]
    Network(#[from] HttpClientError),

    /// An authorized request failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The answer could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The granted credential could not be stored.
    #[error("failed to store credential: {0}")]
    Storage(#[from] CredentialStoreError),
}

impl AuthError {
    /// Builds a `Rejected` error from a failed response, preferring the
    /// backend's own `detail` message over `fallback`.
    #[must_use]
    pub fn rejected(response: &ResponseSpec, fallback: &str) -> Self {
        Self::Rejected {
            status: response.status.as_u16(),
            message: response
                .error_detail()
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}
