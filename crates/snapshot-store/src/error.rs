use thiserror::Error;

/// Errors that can occur when reading or writing a persisted snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be serialized, or the persisted bytes did not parse.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the persisted document exists but could not be parsed.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Serialization(e) if !e.is_io())
    }
}

/// Result type for snapshot store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
