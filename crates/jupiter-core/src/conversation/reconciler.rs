//! Optimistic mutation state machine for one conversation.
//!
//! A user-initiated send must appear instantly but is only authoritative once
//! the server responds. This module owns the ordered entry sequence and the
//! `Idle -> Pending -> Idle` send cycle that keeps it consistent:
//!
//! - `begin_send` appends a provisional record and gates further sends
//! - `confirm` swaps the provisional record for the authoritative one(s)
//! - `fail` keeps the attempted record visible and appends an inline notice
//! - `replace_all` adopts a full server reload, barred while a send is
//!   in flight so it cannot clobber the provisional record

use super::message::{ConversationEntry, EntryAuthor};
use crate::error::{JupiterError, Result};

/// Send state of one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    /// No provisional record outstanding; sends are accepted.
    #[default]
    Idle,
    /// A send is in flight; further sends are rejected and reloads skipped.
    Pending,
}

/// One conversation's ordered entry sequence plus its send state.
///
/// Invariant: at most one provisional entry (no id, not synthetic) exists at
/// any instant, and only while the state is `Pending`.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
    state: SendState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SendState::Pending
    }

    /// Number of provisional entries currently in the sequence (0 or 1).
    pub fn provisional_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_provisional()).count()
    }

    /// Accepts a send: appends the provisional record and moves to `Pending`.
    ///
    /// # Errors
    ///
    /// Returns `JupiterError::SendInFlight` while a previous send is pending,
    /// preserving the at-most-one-in-flight invariant.
    pub fn begin_send(&mut self, author: EntryAuthor, content: impl Into<String>) -> Result<()> {
        if self.is_pending() {
            return Err(JupiterError::SendInFlight);
        }
        self.entries
            .push(ConversationEntry::provisional(author, content));
        self.state = SendState::Pending;
        Ok(())
    }

    /// Applies the authoritative outcome of a send: removes the provisional
    /// record and appends the server-confirmed record(s) in server order,
    /// then returns to `Idle`.
    pub fn confirm(&mut self, records: impl IntoIterator<Item = ConversationEntry>) {
        self.remove_provisional();
        self.entries.extend(records);
        self.state = SendState::Idle;
    }

    /// Records a failed send: the attempted record stays visible (so the
    /// user sees what they tried to send) and a local-only error notice is
    /// appended after it, then the conversation returns to `Idle`.
    ///
    /// The attempted record is demoted to local-only: its send cycle is over,
    /// it will never be confirmed, and it must not occupy the provisional
    /// slot of a later retry. Like the notice, it disappears on the next
    /// full reload since neither is server history.
    pub fn fail(&mut self, notice: impl Into<String>) {
        if let Some(index) = self.entries.iter().rposition(|e| e.is_provisional()) {
            self.entries[index].synthetic = true;
        }
        self.entries.push(ConversationEntry::notice(notice));
        self.state = SendState::Idle;
    }

    /// Replaces the entire local sequence with a server reload.
    ///
    /// Returns `false` without touching anything while a send is pending;
    /// a reload at that moment would clobber the in-flight provisional
    /// record. Synthetic error notices never survive a reload because the
    /// incoming sequence is server history only.
    pub fn replace_all(&mut self, entries: Vec<ConversationEntry>) -> bool {
        if self.is_pending() {
            return false;
        }
        self.entries = entries;
        true
    }

    fn remove_provisional(&mut self) {
        if let Some(index) = self.entries.iter().rposition(|e| e.is_provisional()) {
            self.entries.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::message::ChatMessage;

    fn confirmed(id: i64, role: &str, content: &str) -> ConversationEntry {
        ConversationEntry::from_chat(ChatMessage {
            id: Some(id),
            role: role.to_string(),
            content: content.to_string(),
            created_at: Some("2026-01-01T00:00:00Z".to_string()),
        })
    }

    #[test]
    fn begin_send_appends_provisional_and_goes_pending() {
        let mut convo = Conversation::new();
        convo.begin_send(EntryAuthor::User, "hi").unwrap();
        assert!(convo.is_pending());
        assert_eq!(convo.provisional_count(), 1);
        assert_eq!(convo.entries().last().unwrap().content, "hi");
    }

    #[test]
    fn second_send_is_rejected_while_pending() {
        let mut convo = Conversation::new();
        convo.begin_send(EntryAuthor::User, "first").unwrap();
        let err = convo.begin_send(EntryAuthor::User, "second").unwrap_err();
        assert!(err.is_send_in_flight());
        // the rejected send left no trace
        assert_eq!(convo.provisional_count(), 1);
        assert_eq!(convo.entries().len(), 1);
    }

    #[test]
    fn confirm_swaps_provisional_for_server_records_in_order() {
        let mut convo = Conversation::new();
        convo.begin_send(EntryAuthor::User, "hi").unwrap();
        convo.confirm([confirmed(1, "user", "hi"), confirmed(2, "assistant", "hello!")]);

        assert!(!convo.is_pending());
        assert_eq!(convo.provisional_count(), 0);
        let ids: Vec<_> = convo.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn fail_keeps_attempted_entry_and_appends_notice() {
        let mut convo = Conversation::new();
        convo.begin_send(EntryAuthor::User, "hi").unwrap();
        convo.fail("Sorry, something went wrong: boom");

        assert!(!convo.is_pending());
        // the attempted entry stays visible but no longer occupies the
        // provisional slot, so a retry cannot create a second one
        assert_eq!(convo.entries()[0].content, "hi");
        assert_eq!(convo.provisional_count(), 0);
        let last = convo.entries().last().unwrap();
        assert!(last.synthetic);

        convo.begin_send(EntryAuthor::User, "hi again").unwrap();
        assert_eq!(convo.provisional_count(), 1);
    }

    #[test]
    fn reload_after_failure_drops_notice_but_keeps_server_history() {
        let mut convo = Conversation::new();
        convo.replace_all(vec![confirmed(1, "user", "old")]);
        convo.begin_send(EntryAuthor::User, "hi").unwrap();
        convo.fail("Sorry, something went wrong: boom");

        assert!(convo.replace_all(vec![confirmed(1, "user", "old")]));
        assert_eq!(convo.entries().len(), 1);
        assert!(convo.entries().iter().all(|e| !e.synthetic));
    }

    #[test]
    fn reload_is_barred_while_pending() {
        let mut convo = Conversation::new();
        convo.begin_send(EntryAuthor::User, "hi").unwrap();
        assert!(!convo.replace_all(Vec::new()));
        assert_eq!(convo.provisional_count(), 1);
    }

    #[test]
    fn at_most_one_provisional_across_full_cycle() {
        let mut convo = Conversation::new();
        for round in 0..3 {
            convo.begin_send(EntryAuthor::User, format!("m{round}")).unwrap();
            assert_eq!(convo.provisional_count(), 1);
            convo.confirm([
                confirmed(round * 2 + 1, "user", "m"),
                confirmed(round * 2 + 2, "assistant", "r"),
            ]);
            assert_eq!(convo.provisional_count(), 0);
        }
    }
}
