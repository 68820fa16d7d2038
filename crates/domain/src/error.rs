//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A request path is not relative to the API base.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A required header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be built.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The role name is not one the backend knows.
    #[error("unknown user role: {0}")]
    UnknownRole(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
