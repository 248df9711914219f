//! Conversation message types.

use serde::{Deserialize, Serialize};

/// One agent-chat message as stored by the remote service.
///
/// `id == None` marks a provisional record: created locally, not yet
/// confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub role: String,
    pub content: String,
    pub created_at: Option<String>,
}

/// Response to sending one agent-chat message: the stored copy of the user's
/// message followed by the generated agent reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub agent_message: ChatMessage,
}

/// One peer direct message as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: i64,
    pub match_id: i64,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

/// Who authored a conversation entry, normalized across both flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryAuthor {
    /// The logged-in user.
    User,
    /// The user's own AI agent (agent chat only).
    Agent,
    /// The matched peer (direct-message threads only).
    Peer,
}

/// One entry in an ordered conversation sequence.
///
/// `id == None` together with `synthetic == false` marks the provisional
/// record awaiting server confirmation; `synthetic == true` marks a
/// locally-created error notice that is never sent to the server and is
/// dropped by any full-history reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: Option<i64>,
    pub author: EntryAuthor,
    pub content: String,
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl ConversationEntry {
    /// Creates the provisional record for an outgoing send, stamped with the
    /// current client time.
    pub fn provisional(author: EntryAuthor, content: impl Into<String>) -> Self {
        Self {
            id: None,
            author,
            content: content.into(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            synthetic: false,
        }
    }

    /// Creates a local-only error notice shown inline after a failed send.
    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            id: None,
            author: EntryAuthor::Agent,
            content: content.into(),
            created_at: None,
            synthetic: true,
        }
    }

    /// True for the one record per conversation that is awaiting server
    /// confirmation.
    pub fn is_provisional(&self) -> bool {
        self.id.is_none() && !self.synthetic
    }

    /// Maps a stored agent-chat message onto the shared entry shape.
    pub fn from_chat(message: ChatMessage) -> Self {
        let author = if message.role == "assistant" {
            EntryAuthor::Agent
        } else {
            EntryAuthor::User
        };
        Self {
            id: message.id,
            author,
            content: message.content,
            created_at: message.created_at,
            synthetic: false,
        }
    }

    /// Maps a stored direct message onto the shared entry shape. Authorship
    /// is decided by comparing the sender against the logged-in user's id.
    pub fn from_direct(message: DirectMessage, current_user_id: &str) -> Self {
        let author = if message.sender_id == current_user_id {
            EntryAuthor::User
        } else {
            EntryAuthor::Peer
        };
        Self {
            id: Some(message.id),
            author,
            content: message.content,
            created_at: Some(message.created_at),
            synthetic: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_chat_maps_roles() {
        let msg = ChatMessage {
            id: Some(1),
            role: "assistant".to_string(),
            content: "hello".to_string(),
            created_at: Some("2026-01-01T00:00:00Z".to_string()),
        };
        let entry = ConversationEntry::from_chat(msg);
        assert_eq!(entry.author, EntryAuthor::Agent);
        assert!(!entry.is_provisional());
    }

    #[test]
    fn from_direct_decides_authorship_by_sender() {
        let msg = DirectMessage {
            id: 3,
            match_id: 7,
            sender_id: "u-1".to_string(),
            content: "hey".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };
        assert_eq!(
            ConversationEntry::from_direct(msg.clone(), "u-1").author,
            EntryAuthor::User
        );
        assert_eq!(
            ConversationEntry::from_direct(msg, "u-2").author,
            EntryAuthor::Peer
        );
    }

    #[test]
    fn notice_is_synthetic_and_never_provisional() {
        let entry = ConversationEntry::notice("Sorry, something went wrong");
        assert!(entry.synthetic);
        assert!(entry.id.is_none());
        assert!(!entry.is_provisional());
    }
}
