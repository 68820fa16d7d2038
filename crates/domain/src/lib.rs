//! Relay Domain - Core types
//!
//! This crate defines the domain model for the Relay request dispatcher.
//! All types here are pure Rust with no I/O dependencies.

pub mod credential;
pub mod error;
pub mod refresh;
pub mod request;
pub mod response;
pub mod session;
pub mod settings;

pub use credential::{BEARER_SCHEME, Credential, bearer, token_preview};
pub use error::{DomainError, DomainResult};
pub use refresh::RefreshState;
pub use request::{AUTHORIZATION, Header, Headers, HttpMethod, RequestBody, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
pub use session::{AuthGrant, Navigation, SessionUser, UserRole};
pub use settings::ClientSettings;
