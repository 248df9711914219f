//! Error types for the Jupiter client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Jupiter client.
///
/// The request pipeline classifies every remote failure into exactly one of
/// `Unauthorized`, `RequestFailed` or `Network`; downstream components branch
/// only on those variants and never see transport details. The remaining
/// variants cover local concerns (storage, serialization, configuration).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum JupiterError {
    /// The remote service rejected our session. Always fatal to the session;
    /// the pipeline has already torn it down by the time this is returned.
    #[error("session invalid or expired")]
    Unauthorized,

    /// The remote service rejected the operation. Carries the human-readable
    /// message from the structured error body when one was present.
    #[error("{0}")]
    RequestFailed(String),

    /// No response at all (connect failure, timeout, dropped connection).
    #[error("network error: {0}")]
    Network(String),

    /// A send is already in flight for this conversation; the new send was
    /// rejected to preserve the at-most-one-provisional invariant.
    #[error("a send is already in flight for this conversation")]
    SendInFlight,

    /// IO error (durable credential storage)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl JupiterError {
    /// Creates a RequestFailed error
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Serialization error
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is an Unauthorized error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if this is a RequestFailed error
    pub fn is_request_failed(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is a SendInFlight error
    pub fn is_send_in_flight(&self) -> bool {
        matches!(self, Self::SendInFlight)
    }
}

impl From<std::io::Error> for JupiterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for JupiterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, JupiterError>`.
pub type Result<T> = std::result::Result<T, JupiterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_predicates() {
        assert!(JupiterError::Unauthorized.is_unauthorized());
        assert!(JupiterError::request_failed("nope").is_request_failed());
        assert!(JupiterError::network("refused").is_network());
        assert!(JupiterError::SendInFlight.is_send_in_flight());
        assert!(!JupiterError::network("refused").is_unauthorized());
    }

    #[test]
    fn request_failed_displays_server_message() {
        let err = JupiterError::request_failed("Message cannot be empty");
        assert_eq!(err.to_string(), "Message cannot be empty");
    }
}
