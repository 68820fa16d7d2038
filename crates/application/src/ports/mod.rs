//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod auth_gateway;
mod credential_store;
mod file_system;
mod http_client;
mod session_listener;
mod token_refresher;

pub use auth_gateway::AuthGateway;
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{HttpClient, HttpClientError};
pub use session_listener::SessionListener;
pub use token_refresher::TokenRefresher;
