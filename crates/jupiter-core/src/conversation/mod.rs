//! Conversation domain module.
//!
//! Covers both conversation flavors the client displays: the agent chat
//! (user talking to their own AI agent) and peer direct-message threads.
//! Both share one ordered entry type and one optimistic-send state machine.
//!
//! - `message`: wire message shapes and the shared `ConversationEntry`
//! - `reconciler`: the per-conversation optimistic mutation state machine

mod message;
mod reconciler;

pub use message::{ChatExchange, ChatMessage, ConversationEntry, DirectMessage, EntryAuthor};
pub use reconciler::{Conversation, SendState};
