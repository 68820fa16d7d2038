//! File-backed credential store.
//!
//! The pair is kept in a single JSON file so it survives restarts:
//! ```json
//! {
//!   "token": "eyJhbGciOi...",
//!   "refresh_token": "eyJhbGciOi..."
//! }
//! ```
//! Writes go to a sibling temporary file that is then renamed over the
//! real one, so a crash never leaves half a pair on disk.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use relay_application::ports::{
    CredentialStore, CredentialStoreError, FileSystem, FileSystemError,
};
use relay_domain::Credential;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// On-disk layout of the credential file.
#[derive(Debug, Serialize, Deserialize)]
struct CredentialFile {
    token: String,
    refresh_token: String,
}

impl From<&Credential> for CredentialFile {
    fn from(credential: &Credential) -> Self {
        Self {
            token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
        }
    }
}

impl From<CredentialFile> for Credential {
    fn from(file: CredentialFile) -> Self {
        Self::new(file.token, file.refresh_token)
    }
}

/// Credential store persisted to a JSON file.
///
/// Reads are served from memory; the file is only read once, by
/// [`FileCredentialStore::open`].
#[derive(Debug)]
pub struct FileCredentialStore<F> {
    fs: F,
    path: PathBuf,
    cached: RwLock<Option<Credential>>,
}

impl<F: FileSystem> FileCredentialStore<F> {
    /// Opens the store at `path`, loading any pair already saved there.
    ///
    /// A missing file means no session. A malformed file, or one missing
    /// either token, is logged and also treated as no session.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be read for a
    /// reason other than its contents, such as missing permissions.
    pub async fn open(fs: F, path: impl Into<PathBuf>) -> Result<Self, CredentialStoreError> {
        let path = path.into();
        let cached = Self::load(&fs, &path).await?;
        debug!(path = %path.display(), restored = cached.is_some(), "credential store opened");

        Ok(Self {
            fs,
            path,
            cached: RwLock::new(cached),
        })
    }

    /// Returns the file backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(fs: &F, path: &Path) -> Result<Option<Credential>, CredentialStoreError> {
        let content = match fs.read_file(path).await {
            Ok(content) => content,
            Err(FileSystemError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(CredentialStoreError::Io(e.into())),
        };

        match from_json_bytes::<CredentialFile>(&content) {
            Ok(file) if !file.token.is_empty() && !file.refresh_token.is_empty() => {
                Ok(Some(file.into()))
            }
            Ok(_) => {
                debug!(path = %path.display(), "credential file holds an incomplete pair");
                Ok(None)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring malformed credential file");
                Ok(None)
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Default location of the credential file.
///
/// - Linux: `~/.local/share/relay/credentials.json`
/// - macOS: `~/Library/Application Support/relay/credentials.json`
/// - Windows: `%APPDATA%\relay\credentials.json`
#[must_use]
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("relay").join("credentials.json"))
}

#[async_trait]
impl<F: FileSystem + Sync> CredentialStore for FileCredentialStore<F> {
    async fn get(&self) -> Option<Credential> {
        self.cached.read().await.clone()
    }

    async fn set(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        // Held across the write so concurrent writers land in order.
        let mut cached = self.cached.write().await;

        let content = to_json_stable_bytes(&CredentialFile::from(&credential))
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;
        let temp = self.temp_path();
        self.fs
            .write_file(&temp, &content)
            .await
            .map_err(|e| CredentialStoreError::Io(e.into()))?;
        self.fs
            .rename(&temp, &self.path)
            .await
            .map_err(|e| CredentialStoreError::Io(e.into()))?;

        *cached = Some(credential);
        Ok(())
    }

    async fn clear(&self) {
        let mut cached = self.cached.write().await;
        cached.take();

        match self.fs.remove_file(&self.path).await {
            Ok(()) | Err(FileSystemError::NotFound(_)) => {}
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to delete credential file");
            }
        }
    }
}
