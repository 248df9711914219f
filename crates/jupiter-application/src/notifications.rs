//! Notification feed service.
//!
//! The feed is read-mostly; the only client-side mutation is the mark-read
//! transition, applied optimistically and reverted if the server rejects it.

use jupiter_api::ApiClient;
use jupiter_core::error::Result;
use jupiter_core::notification::Notification;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct NotificationCenter {
    api: Arc<ApiClient>,
    items: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replaces the local feed with the server's. The server's `is_read`
    /// values win; an earlier optimistic flip survives only if the server
    /// agrees.
    pub async fn reload(&self) -> Result<()> {
        let feed = self.api.notifications().await?;
        *self.items.write().await = feed;
        Ok(())
    }

    pub async fn items(&self) -> Vec<Notification> {
        self.items.read().await.clone()
    }

    /// Cheap unread-count check backing the badge; polled on its own lease.
    pub async fn unread_count(&self) -> Result<u64> {
        self.api.unread_count().await
    }

    /// Marks one notification read: the local flip happens immediately, the
    /// server confirms afterwards. On failure the flip is reverted and the
    /// error returned. Unknown or already-read ids are a no-op.
    pub async fn mark_read(&self, id: i64) -> Result<()> {
        let flipped = {
            let mut items = self.items.write().await;
            match items.iter_mut().find(|n| n.id == id && !n.is_read) {
                Some(notification) => {
                    notification.is_read = true;
                    true
                }
                None => false,
            }
        };
        if !flipped {
            return Ok(());
        }

        if let Err(err) = self.api.mark_notification_read(id).await {
            tracing::warn!(id, error = %err, "mark-read rejected; reverting local flip");
            let mut items = self.items.write().await;
            if let Some(notification) = items.iter_mut().find(|n| n.id == id) {
                notification.is_read = false;
            }
            return Err(err);
        }
        Ok(())
    }
}
