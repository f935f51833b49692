//! Error types for protocol operations.

use thiserror::Error;

/// Errors that can occur when validating protocol types.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A task title was empty or whitespace-only.
    #[error("invalid task title: title cannot be empty")]
    InvalidTaskTitle,
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ProtocolError::InvalidTaskTitle;
        assert_eq!(err.to_string(), "invalid task title: title cannot be empty");
    }
}
