//! HTTP Client port

use std::future::Future;
use std::sync::Arc;

use relay_domain::{RequestSpec, ResponseSpec};
use thiserror::Error;

/// Transport-level failures. None of these is related to authorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The target URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The response body could not be read.
    #[error("failed to read response: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests against the backend.
///
/// Implementations resolve `RequestSpec::path` against their configured
/// base URL and send the headers exactly as given; they never add or
/// strip credentials themselves.
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the response, whatever its
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send {
        (**self).execute(request)
    }
}
