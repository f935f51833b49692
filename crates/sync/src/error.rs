//! Error types for persistence coordination.

use hebdo_protocol::ProtocolError;
use hebdo_storage::StorageError;

/// Errors surfaced by the persistence coordinator.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A mutation failed validation before any backend call was made.
    #[error(transparent)]
    Validation(#[from] ProtocolError),

    /// The backend call failed; the optimistic state has been rolled back.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Import data could not be understood.
    #[error("could not parse import data: {0}")]
    InvalidImport(String),

    /// The current state could not be serialized for export.
    #[error("failed to serialize export data: {0}")]
    Export(#[source] serde_json::Error),
}

/// A specialized Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
