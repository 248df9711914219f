//! Agent chat service.
//!
//! Drives the conversation between the user and their own agent: optimistic
//! sends through the per-conversation reconciler, full-history reloads on
//! view activation, and the inline error notice on failure.

use jupiter_api::ApiClient;
use jupiter_core::conversation::{Conversation, ConversationEntry, EntryAuthor};
use jupiter_core::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Conversation with the user's own agent.
pub struct AgentChatService {
    api: Arc<ApiClient>,
    conversation: Arc<RwLock<Conversation>>,
}

impl AgentChatService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            conversation: Arc::new(RwLock::new(Conversation::new())),
        }
    }

    /// Snapshot of the ordered entry sequence.
    pub async fn entries(&self) -> Vec<ConversationEntry> {
        self.conversation.read().await.entries().to_vec()
    }

    /// True while a send is awaiting the server; the input stays disabled.
    pub async fn is_pending(&self) -> bool {
        self.conversation.read().await.is_pending()
    }

    /// Replaces the local sequence with the full server history.
    ///
    /// Returns `false` when the reload was skipped because a send is in
    /// flight; reloading at that moment would clobber the provisional record.
    pub async fn reload(&self) -> Result<bool> {
        if self.conversation.read().await.is_pending() {
            tracing::debug!("skipping chat reload while a send is in flight");
            return Ok(false);
        }
        let history = self.api.chat_history().await?;
        let entries = history.into_iter().map(ConversationEntry::from_chat).collect();
        // re-checked under the write lock; a send may have started meanwhile
        Ok(self.conversation.write().await.replace_all(entries))
    }

    /// Optimistic send: the message appears immediately, then is replaced by
    /// the stored copy and the agent's reply once the server confirms.
    ///
    /// On failure the attempted message stays visible and an inline error
    /// notice is appended; the error is also returned to the caller.
    pub async fn send(&self, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }
        self.conversation
            .write()
            .await
            .begin_send(EntryAuthor::User, content)?;

        match self.api.send_chat_message(content).await {
            Ok(exchange) => {
                let mut conversation = self.conversation.write().await;
                conversation.confirm([
                    ConversationEntry::from_chat(exchange.user_message),
                    ConversationEntry::from_chat(exchange.agent_message),
                ]);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat send failed");
                let mut conversation = self.conversation.write().await;
                conversation.fail(format!("Sorry, something went wrong: {err}"));
                Err(err)
            }
        }
    }
}
