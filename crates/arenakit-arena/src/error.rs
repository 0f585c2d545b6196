//! Error types for the arena layer.
//!
//! Lifecycle refusals (lobby full, unknown phase, duplicate join) are not
//! errors; they come back as `bool` or [`JoinOutcome`](crate::JoinOutcome).
//! These variants cover arenas that cannot be reached at all.

/// Errors that can occur when talking to arenas through handles or the
/// registry.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// No arena with this name is registered.
    #[error("arena {0} not found")]
    NotFound(String),

    /// An arena with this name (compared case-insensitively) is already
    /// registered.
    #[error("arena {0} already exists")]
    AlreadyExists(String),

    /// The arena's task has stopped, so its command channel is closed.
    #[error("arena {0} is unavailable")]
    Unavailable(String),
}
