//! Relay Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for external dependencies)
//! - The request dispatcher with single-flight token refresh
//! - The authenticator use case

pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod ports;

pub use auth::{AuthError, Authenticator, MemoryCredentialStore};
pub use dispatcher::{DEFAULT_REFRESH_TIMEOUT, Dispatcher};
pub use error::{DispatchError, DispatchResult, RefreshError};
pub use ports::{
    AuthGateway, CredentialStore, CredentialStoreError, FileSystem, FileSystemError, HttpClient,
    HttpClientError, SessionListener, TokenRefresher,
};
