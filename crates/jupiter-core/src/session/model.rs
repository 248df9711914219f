//! Session and user domain models.

use serde::{Deserialize, Serialize};

/// Public user snapshot as returned by the remote service.
///
/// Immutable from the client's point of view: it is cached alongside the
/// session token and replaced wholesale when profile endpoints are called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub created_at: String,
}

impl UserSummary {
    /// Preferred label for display: the display name, falling back to the
    /// username when no display name was set.
    pub fn display_label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// The authenticated identity context held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token issued by the remote service.
    pub token: String,
    /// Advisory cached user snapshot; may be stale.
    pub user: Option<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: &str) -> UserSummary {
        UserSummary {
            id: "u-1".to_string(),
            username: "ann".to_string(),
            email: "ann@example.com".to_string(),
            display_name: display_name.to_string(),
            bio: String::new(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn display_label_prefers_display_name() {
        assert_eq!(user("Ann A.").display_label(), "Ann A.");
    }

    #[test]
    fn display_label_falls_back_to_username() {
        assert_eq!(user("").display_label(), "ann");
    }
}
