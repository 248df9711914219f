//! Session domain module.
//!
//! A session is the authenticated identity context held by the client:
//! an opaque token plus an advisory cached copy of the user it belongs to.
//! Token presence is the sole truth of "logged in"; the cached user may be
//! stale and is refreshed only when profile endpoints are called.

mod model;
mod store;

pub use model::{Session, UserSummary};
pub use store::CredentialStore;
