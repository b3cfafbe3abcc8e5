//! Backend error types.

use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a transport while delivering a record.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The destination refused the record.
    #[error("Record rejected: {0}")]
    Rejected(String),
}

/// Errors produced by the logging client.
///
/// Delivery failures are never returned to logging callers; they are passed
/// to the client's error handler instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid parent '{0}': expected a project ID or <kind>/<id>")]
    InvalidParent(String),

    #[error("Logging client must be created inside a tokio runtime")]
    NoRuntime,

    #[error("Delivery to '{log_name}' failed: {source}")]
    Transport {
        log_name: String,
        #[source]
        source: TransportError,
    },

    #[error("Buffer full, dropped entry for '{0}'")]
    BufferFull(String),

    #[error("Client closed, dropped entry for '{0}'")]
    Closed(String),

    #[error("Error handler already set")]
    OnErrorAlreadySet,
}

impl ClientError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::InvalidParent(_) => "invalid_parent",
            ClientError::NoRuntime => "no_runtime",
            ClientError::Transport { .. } => "transport",
            ClientError::BufferFull(_) => "buffer_full",
            ClientError::Closed(_) => "closed",
            ClientError::OnErrorAlreadySet => "on_error_already_set",
        }
    }
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Out-of-band receiver of delivery failures.
pub type ErrorHandler = Arc<dyn Fn(ClientError) + Send + Sync>;
