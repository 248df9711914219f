//! Match domain models.
//!
//! Matches are created server-side by the matching process; the client only
//! reads them and triggers their recomputation.

use crate::session::UserSummary;
use serde::{Deserialize, Serialize};

/// One pairing between the logged-in user and another participant, with the
/// two agents' verdicts and the embedded peer snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    pub user_a_id: String,
    pub user_b_id: String,
    pub agent_a_approves: bool,
    pub agent_b_approves: bool,
    /// Derived server-side from both approvals.
    pub is_matched: bool,
    pub created_at: String,
    pub updated_at: String,
    pub other_user: Option<UserSummary>,
}

impl MatchRecord {
    /// Display label for the peer, falling back to "Unknown" when the
    /// embedded snapshot is missing.
    pub fn peer_label(&self) -> &str {
        match &self.other_user {
            Some(user) => user.display_label(),
            None => "Unknown",
        }
    }
}

/// Result of triggering a background match search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingReport {
    pub evaluated: usize,
    pub new_recommendations: usize,
    pub new_matches: usize,
}
