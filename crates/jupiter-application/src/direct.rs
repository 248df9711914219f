//! Direct-message thread service.
//!
//! One instance per open peer thread. Shares the optimistic-send machinery
//! with the agent chat; the difference is the endpoint (one stored message
//! comes back instead of a message/reply pair) and authorship, which is
//! decided by comparing sender ids against the logged-in user.

use jupiter_api::ApiClient;
use jupiter_core::conversation::{Conversation, ConversationEntry, EntryAuthor};
use jupiter_core::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Conversation with a matched peer.
pub struct DirectMessageService {
    api: Arc<ApiClient>,
    match_id: i64,
    current_user_id: String,
    conversation: Arc<RwLock<Conversation>>,
}

impl DirectMessageService {
    pub fn new(api: Arc<ApiClient>, match_id: i64, current_user_id: String) -> Self {
        Self {
            api,
            match_id,
            current_user_id,
            conversation: Arc::new(RwLock::new(Conversation::new())),
        }
    }

    pub fn match_id(&self) -> i64 {
        self.match_id
    }

    pub async fn entries(&self) -> Vec<ConversationEntry> {
        self.conversation.read().await.entries().to_vec()
    }

    pub async fn is_pending(&self) -> bool {
        self.conversation.read().await.is_pending()
    }

    /// Replaces the local sequence with the thread's server history. Runs on
    /// view activation and on every tick of the thread's polling lease;
    /// skipped (returning `false`) while a send is in flight.
    pub async fn reload(&self) -> Result<bool> {
        if self.conversation.read().await.is_pending() {
            tracing::debug!(match_id = self.match_id, "skipping DM reload while a send is in flight");
            return Ok(false);
        }
        let history = self.api.direct_messages(self.match_id).await?;
        let entries = history
            .into_iter()
            .map(|message| ConversationEntry::from_direct(message, &self.current_user_id))
            .collect();
        Ok(self.conversation.write().await.replace_all(entries))
    }

    /// Optimistic send of one peer message.
    pub async fn send(&self, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }
        self.conversation
            .write()
            .await
            .begin_send(EntryAuthor::User, content)?;

        match self.api.send_direct_message(self.match_id, content).await {
            Ok(stored) => {
                let mut conversation = self.conversation.write().await;
                conversation.confirm([ConversationEntry::from_direct(
                    stored,
                    &self.current_user_id,
                )]);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(match_id = self.match_id, error = %err, "DM send failed");
                let mut conversation = self.conversation.write().await;
                conversation.fail(format!("Sorry, something went wrong: {err}"));
                Err(err)
            }
        }
    }
}
