//! Application layer of the Jupiter client.
//!
//! Per-view services over the request pipeline (agent chat, peer threads,
//! notifications, matches, agent knowledge), the polling-lease pool keeping
//! those views fresh, and the `AppController` tying navigation, session
//! lifecycle and lease ownership together.

pub mod app;
pub mod chat;
pub mod direct;
pub mod knowledge;
pub mod matches;
pub mod notifications;
pub mod polling;

pub use app::{AppController, UNREAD_LEASE_KEY};
pub use chat::AgentChatService;
pub use direct::DirectMessageService;
pub use knowledge::{AgentKnowledgeService, KNOWLEDGE_REFRESH_GRACE};
pub use matches::MatchBoard;
pub use notifications::NotificationCenter;
pub use polling::{DM_POLL_PERIOD, PollingLease, PollingPool, UNREAD_POLL_PERIOD};
