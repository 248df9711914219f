//! HTTP layer of the Jupiter client.
//!
//! Home of the authenticated request pipeline (`ApiClient`) and the DTOs
//! that exist only on the wire. Everything above this crate talks to the
//! remote service exclusively through `ApiClient` and sees failures only as
//! `jupiter_core::JupiterError` kinds.

mod client;
pub mod wire;

pub use client::{ApiClient, DEFAULT_BASE_URL, UnauthorizedHook};
