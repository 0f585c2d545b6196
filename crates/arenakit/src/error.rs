//! Unified error type for arenakit.

use arenakit_arena::ArenaError;
use arenakit_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift arena and store errors into this
/// one type in host code.
#[derive(Debug, thiserror::Error)]
pub enum ArenakitError {
    /// An arena could not be found, created or reached.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// Saving or loading arena data failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The global tracing subscriber could not be installed.
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
}
