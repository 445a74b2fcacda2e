//! Error types for the Hearth assistant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a dispatch against the conversation service did not produce messages.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchFailure {
    /// The service answered with an error or could not be reached.
    #[error("service error: {message}")]
    Service { message: String },

    /// No answer arrived within the configured timeout.
    #[error("no response after {after_secs}s")]
    Timeout { after_secs: u64 },
}

/// A shared error type for the entire Hearth assistant.
///
/// Every variant is `Clone` so that failures can travel inside session
/// events to whoever renders them.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum HearthError {
    /// The caller's identity could not be turned into a conversation context.
    #[error("Conversation context unavailable: {reason}")]
    ContextUnavailable { reason: String },

    /// A send, quick-reply or action call failed.
    #[error("Dispatch failed: {0}")]
    DispatchFailed(DispatchFailure),

    /// A response arrived for a session that has since been torn down or reset.
    #[error("Response arrived after the session was closed")]
    StaleResponse,

    /// A message with the same identity is already stored.
    #[error("Duplicate message id: {id}")]
    DuplicateMessage { id: String },

    /// The conversation has not been opened, or has been closed.
    #[error("Conversation is not open")]
    ConversationNotOpen,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HearthError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a ContextUnavailable error
    pub fn context_unavailable(reason: impl Into<String>) -> Self {
        Self::ContextUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a DispatchFailed error for a service-side failure
    pub fn dispatch_failed(message: impl Into<String>) -> Self {
        Self::DispatchFailed(DispatchFailure::Service {
            message: message.into(),
        })
    }

    /// Creates a DispatchFailed error for an expired request
    pub fn timeout(after_secs: u64) -> Self {
        Self::DispatchFailed(DispatchFailure::Timeout { after_secs })
    }

    /// Creates a DuplicateMessage error
    pub fn duplicate_message(id: impl Into<String>) -> Self {
        Self::DuplicateMessage { id: id.into() }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a ContextUnavailable error
    pub fn is_context_unavailable(&self) -> bool {
        matches!(self, Self::ContextUnavailable { .. })
    }

    /// Check if this is a DispatchFailed error (service error or timeout)
    pub fn is_dispatch_failure(&self) -> bool {
        matches!(self, Self::DispatchFailed(_))
    }

    /// Check if this is a dispatch timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::DispatchFailed(DispatchFailure::Timeout { .. }))
    }

    /// Check if this is a StaleResponse
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResponse)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HearthError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HearthError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, HearthError>`.
pub type Result<T> = std::result::Result<T, HearthError>;
