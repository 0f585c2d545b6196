//! Logging setup for hosts embedding arenakit.
//!
//! The engine only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`init`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::ArenakitError;

/// Installs a formatted stderr subscriber filtered by `RUST_LOG`, falling
/// back to `default_filter` (e.g. `"info"` or `"arenakit_arena=debug"`)
/// when the variable is unset or invalid.
///
/// Fails if a global subscriber is already installed.
pub fn init(default_filter: &str) -> Result<(), ArenakitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let directives = filter.to_string();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ArenakitError::Telemetry(e.to_string()))?;
    tracing::debug!(filter = %directives, "logging initialized");
    Ok(())
}
