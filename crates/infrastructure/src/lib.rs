//! Relay Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod auth;
pub mod navigation;
pub mod persistence;
pub mod serialization;
pub mod settings;

pub use adapters::ReqwestHttpClient;
pub use auth::HttpAuthClient;
pub use navigation::SignInRedirector;
pub use persistence::{FileCredentialStore, TokioFileSystem, default_credentials_path};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use settings::{ENV_PREFIX, SettingsError, default_config_path, load_settings};
