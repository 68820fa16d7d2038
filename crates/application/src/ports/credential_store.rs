//! Credential store port

use async_trait::async_trait;
use relay_domain::Credential;

/// Errors that can occur while persisting credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Holder of the current access/refresh token pair.
///
/// The pair is written and cleared as a unit, so readers never observe
/// one half without the other.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored pair, if any.
    async fn get(&self) -> Option<Credential>;

    /// Replaces the stored pair.
    ///
    /// # Errors
    /// Returns an error if the pair could not be persisted. The previous
    /// pair is then left in place.
    async fn set(&self, credential: Credential) -> Result<(), CredentialStoreError>;

    /// Forgets the stored pair. Idempotent and infallible toward the caller.
    async fn clear(&self);
}
