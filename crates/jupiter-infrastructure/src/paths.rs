//! Unified path management for Jupiter client state.
//!
//! All durable client-side state lives under one per-user configuration
//! directory so that a process restart resumes the session without
//! re-authentication.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/jupiter/           # Config directory
//! └── credentials.json         # Session token + cached user snapshot
//! ```

use jupiter_core::error::{JupiterError, Result};
use std::path::PathBuf;

/// Unified path management for the Jupiter client.
pub struct JupiterPaths;

impl JupiterPaths {
    /// Returns the Jupiter configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `JupiterError::Config` when the platform configuration
    /// directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("jupiter"))
            .ok_or_else(|| JupiterError::config("cannot determine config directory"))
    }

    /// Returns the path to the credentials file.
    ///
    /// The file holds the session token and the cached user under fixed,
    /// well-known keys.
    pub fn credentials_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("credentials.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_file_lives_under_config_dir() {
        let file = JupiterPaths::credentials_file().unwrap();
        assert!(file.ends_with("jupiter/credentials.json"));
    }
}
