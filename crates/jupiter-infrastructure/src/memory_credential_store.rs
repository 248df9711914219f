//! In-memory credential store.
//!
//! Substitute for `FileCredentialStore` in tests and anywhere durable
//! persistence is unwanted. Same single-writer contract, no I/O.

use async_trait::async_trait;
use jupiter_core::error::Result;
use jupiter_core::session::{CredentialStore, Session, UserSummary};
use tokio::sync::RwLock;

/// Credential store that lives and dies with the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Option<Session>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn set_session(&self, token: String, user: UserSummary) -> Result<()> {
        let mut session = self.session.write().await;
        *session = Some(Session {
            token,
            user: Some(user),
        });
        Ok(())
    }

    async fn token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    async fn user(&self) -> Option<UserSummary> {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.user.clone())
    }

    async fn clear(&self) -> Result<()> {
        let mut session = self.session.write().await;
        *session = None;
        Ok(())
    }
}
