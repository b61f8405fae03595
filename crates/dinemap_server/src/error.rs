//! Error types for the restaurant server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dinemap_protocol::{DraftError, ErrorBody, ProtocolError, RestaurantId};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the restaurant server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// No restaurant with this id.
    #[error("restaurant {0} not found")]
    NotFound(RestaurantId),

    /// Path segment that is not a restaurant id.
    #[error("restaurant {0} not found")]
    UnknownId(String),

    /// Malformed status or create payload.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Sending to one connection failed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Event could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::NotFound(_)
                | ServerError::UnknownId(_)
                | ServerError::InvalidArgument(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) | ServerError::UnknownId(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DraftError> for ServerError {
    fn from(err: DraftError) -> Self {
        ServerError::InvalidArgument(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
