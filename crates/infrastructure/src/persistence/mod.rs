//! Persistence adapters.

mod credential_file;
mod file_system;

pub use credential_file::{FileCredentialStore, default_credentials_path};
pub use file_system::TokioFileSystem;
