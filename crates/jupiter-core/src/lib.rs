//! Domain layer of the Jupiter client.
//!
//! Pure models, the shared error type, the credential store trait, and the
//! two client-side state machines (navigation views and the per-conversation
//! optimistic send reconciler). No I/O happens in this crate.

pub mod agent;
pub mod conversation;
pub mod error;
pub mod matching;
pub mod notification;
pub mod session;
pub mod view;

// Re-export common error type
pub use error::{JupiterError, Result};
