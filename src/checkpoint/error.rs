//! Checkpoint error types.

use crate::persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while taking, encoding or restoring a snapshot.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Encoding to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Decoding from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot was written by an incompatible format version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot contents are inconsistent
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),

    #[error("Checkpoint file error: {0}")]
    Io(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<std::io::Error> for CheckpointError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
