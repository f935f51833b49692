//! Error types for storage operations.

use hebdo_protocol::TaskId;

/// Errors that can occur in a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage medium is unreachable or unusable.
    ///
    /// Callers degrade to an empty task list rather than crashing when
    /// listing fails this way.
    #[error("storage unavailable: {reason}")]
    Unavailable {
        /// A description of what went wrong.
        reason: String,
    },

    /// An update or delete referenced an id the backing store does not
    /// know.
    #[error("no task with id {0}")]
    NotFound(TaskId),

    /// A remote call failed at the transport level (connection, timeout,
    /// malformed body).
    #[error("task API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The task API answered with a non-success status.
    #[error("task API returned {status}: {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The response body, as far as it could be read.
        message: String,
    },

    /// Task data could not be serialized or deserialized.
    #[error("failed to serialize task data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An I/O error occurred while touching the local medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
