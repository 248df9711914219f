//! File-backed credential store implementation.
//!
//! Persists the session token and cached user snapshot as a JSON file under
//! the Jupiter config directory, so a restart resumes the session as long as
//! the token remains valid. The file is loaded once at construction and
//! cached in memory; every mutation updates the cache first and then writes
//! the whole file back.

use crate::paths::JupiterPaths;
use async_trait::async_trait;
use jupiter_core::error::Result;
use jupiter_core::session::{CredentialStore, UserSummary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// On-disk shape of the credentials file. Fixed, well-known keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    token: Option<String>,
    user: Option<UserSummary>,
}

/// Credential store backed by `~/.config/jupiter/credentials.json`.
pub struct FileCredentialStore {
    path: PathBuf,
    cache: RwLock<StoredCredentials>,
}

impl FileCredentialStore {
    /// Opens the store at its default location, loading any persisted
    /// session.
    pub async fn open_default() -> Result<Self> {
        Self::open(JupiterPaths::credentials_file()?).await
    }

    /// Opens the store at an explicit path. Used by tests with a temp dir.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let cache = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(stored) => stored,
                Err(err) => {
                    // Unreadable file means no resumable session; start clean
                    // rather than refusing to run.
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "credentials file is corrupt; starting unauthenticated"
                    );
                    StoredCredentials::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredCredentials::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Writes the whole file back via a temp file and atomic rename, so a
    /// crash mid-write can never leave a truncated credentials file.
    async fn persist(&self, stored: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(stored)?;

        // Temp file in the same directory, so the rename stays on one
        // filesystem and is atomic.
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = fs::File::create(&tmp_path).await?;
        tmp_file.write_all(&bytes).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn set_session(&self, token: String, user: UserSummary) -> Result<()> {
        let stored = StoredCredentials {
            token: Some(token),
            user: Some(user),
        };
        {
            let mut cache = self.cache.write().await;
            *cache = stored.clone();
        }
        self.persist(&stored).await
    }

    async fn token(&self) -> Option<String> {
        self.cache.read().await.token.clone()
    }

    async fn user(&self) -> Option<UserSummary> {
        self.cache.read().await.user.clone()
    }

    async fn clear(&self) -> Result<()> {
        let stored = StoredCredentials::default();
        {
            let mut cache = self.cache.write().await;
            *cache = stored.clone();
        }
        self.persist(&stored).await
    }
}
