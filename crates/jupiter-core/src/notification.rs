//! Notification domain models.

use serde::{Deserialize, Serialize};

/// Notification kind, derived from the wire type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// An agent proposed a potential match.
    Proposal,
    /// Both agents agreed; a mutual match exists.
    MatchConfirmed,
    /// Anything the client does not recognize.
    Other,
}

impl NotificationKind {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "proposal" => Self::Proposal,
            "match_confirmed" => Self::MatchConfirmed,
            _ => Self::Other,
        }
    }
}

/// One notification feed item. The only client-side mutation is the
/// mark-read transition, which is optimistic and then confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub related_user_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from_wire(&self.notification_type)
    }
}

/// Response of the cheap unread-count endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}
