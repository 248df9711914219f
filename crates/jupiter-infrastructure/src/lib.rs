//! Infrastructure layer of the Jupiter client.
//!
//! Durable credential storage and path management. Implements the
//! `CredentialStore` trait from `jupiter-core` against the filesystem, plus
//! an in-memory variant for tests.

mod file_credential_store;
mod memory_credential_store;
mod paths;

pub use file_credential_store::FileCredentialStore;
pub use memory_credential_store::MemoryCredentialStore;
pub use paths::JupiterPaths;
