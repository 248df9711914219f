//! Agent knowledge domain model.
//!
//! The "agent profile" is what the user's AI agent has learned about them.
//! It is produced by a server-side background analysis; the client reads it
//! and can nudge the server to recompute it.

use serde::{Deserialize, Serialize};

/// Learned personality fields for one user, as maintained by their agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgentProfile {
    pub user_id: String,
    pub personality_summary: String,
    pub interests: String,
    pub core_values: String,
    pub communication_style: String,
    pub looking_for: String,
    pub deal_breakers: String,
    pub raw_notes: String,
    pub updated_at: String,
}

impl AgentProfile {
    /// True once the analysis has produced anything at all. An agent that
    /// has neither a personality summary nor interests is still learning.
    pub fn is_learned(&self) -> bool {
        !self.personality_summary.is_empty() || !self.interests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_profile_is_not_learned() {
        assert!(!AgentProfile::default().is_learned());
    }

    #[test]
    fn any_summary_counts_as_learned() {
        let profile = AgentProfile {
            interests: "hiking".to_string(),
            ..AgentProfile::default()
        };
        assert!(profile.is_learned());
    }
}
