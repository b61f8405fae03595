//! Error types for the sync agent.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while following the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the connection can be retried.
        retryable: bool,
    },

    /// An established connection went away.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// A frame could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The agent was stopped.
    #[error("sync cancelled")]
    Cancelled,

    /// The server URL is not a socket URL.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if a reconnect should be scheduled after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::ConnectionLost(_) => true,
            SyncError::Protocol(_) | SyncError::Cancelled | SyncError::InvalidUrl(_) => false,
        }
    }
}

impl From<dinemap_protocol::ProtocolError> for SyncError {
    fn from(e: dinemap_protocol::ProtocolError) -> Self {
        SyncError::Protocol(e.to_string())
    }
}
