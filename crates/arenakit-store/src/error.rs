//! Error types for arena persistence.

/// Errors that can occur while saving or loading arena data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The arena name cannot be used as a storage key (empty, or contains a
    /// path separator or a leading dot).
    #[error("invalid arena name {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("malformed arena data: {0}")]
    Json(#[from] serde_json::Error),
}
