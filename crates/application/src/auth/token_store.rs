//! In-memory credential storage.
//!
//! Used for ephemeral sessions and in tests. Nothing survives a restart;
//! the file-backed store in the infrastructure crate does.

use std::sync::Arc;

use async_trait::async_trait;
use relay_domain::Credential;
use tokio::sync::RwLock;

use crate::ports::{CredentialStore, CredentialStoreError};

/// Thread-safe in-memory credential store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credential: Arc<RwLock<Option<Credential>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a credential.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Arc::new(RwLock::new(Some(credential))),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    async fn set(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        *self.credential.write().await = Some(credential);
        Ok(())
    }

    async fn clear(&self) {
        self.credential.write().await.take();
    }
}
