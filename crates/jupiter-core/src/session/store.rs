//! Credential store trait.
//!
//! Defines the interface for durable session credential storage, decoupling
//! the rest of the client from the specific storage mechanism so tests can
//! substitute an in-memory implementation.

use super::model::UserSummary;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store for the current session credentials.
///
/// The store is the only piece of state shared across all client components.
/// It has a single-writer discipline: only login, registration, logout and
/// the request pipeline's unauthorized handler may mutate it, and every
/// mutation fully overwrites or fully clears it.
///
/// No network I/O may originate here; reads must only touch the store itself.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists the token and user snapshot atomically (full overwrite).
    async fn set_session(&self, token: String, user: UserSummary) -> Result<()>;

    /// Returns the current token, if a session is established.
    async fn token(&self) -> Option<String>;

    /// Returns the cached user snapshot, if one was stored.
    async fn user(&self) -> Option<UserSummary>;

    /// Removes both token and cached user. Idempotent.
    async fn clear(&self) -> Result<()>;

    /// True iff a token is present. Token presence is the sole truth of
    /// "logged in"; the cached user is advisory.
    async fn is_active(&self) -> bool {
        self.token().await.is_some()
    }
}
