//! Navigation view state.
//!
//! A small state machine selecting the active view plus the minimal context
//! that view needs (which peer thread is open). Which polling leases are
//! eligible to run follows from the active view; that wiring lives in the
//! application layer.

use serde::{Deserialize, Serialize};

/// The finite set of client views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum View {
    /// No session; the only view reachable without a token.
    #[default]
    Unauthenticated,
    /// Chat with the user's own agent. Initial view after login.
    PrimaryChat,
    Matches,
    Notifications,
    AgentKnowledge,
    /// An open direct-message thread with a matched peer.
    PeerThread { match_id: i64, peer_name: String },
}

impl View {
    /// Target view for opening a peer thread. A non-positive match id cannot
    /// name a real thread, so it falls back to the match list.
    pub fn open_peer_thread(match_id: i64, peer_name: impl Into<String>) -> Self {
        if match_id <= 0 {
            return Self::Matches;
        }
        Self::PeerThread {
            match_id,
            peer_name: peer_name.into(),
        }
    }

    /// Back navigation: a peer thread returns to the match list it was
    /// opened from; every other view stays put.
    pub fn back(self) -> Self {
        match self {
            Self::PeerThread { .. } => Self::Matches,
            other => other,
        }
    }

    pub fn is_peer_thread(&self) -> bool {
        matches!(self, Self::PeerThread { .. })
    }
}
