//! Arena data persistence for arenakit.
//!
//! Only [`ArenaData`] is stored: name, options, variables, locations and
//! spawns. Phases, rosters and countdowns are runtime state and start fresh
//! when an arena is loaded.
//!
//! # Key types
//!
//! - [`ArenaStore`] — the storage trait
//! - [`JsonDirStore`] — one JSON file per arena in a directory
//! - [`MemoryStore`] — in-process store for tests and tools
//! - [`restore_all`] — load every stored arena into a registry

#![allow(async_fn_in_trait)]

mod error;
mod json;
mod memory;

use std::sync::Arc;

use arenakit_arena::{Arena, ArenaData, ArenaError, ArenaRegistry, Host};

pub use error::StoreError;
pub use json::JsonDirStore;
pub use memory::MemoryStore;

/// Somewhere arena data can be kept between runs.
///
/// Names are case-insensitive, matching [`ArenaRegistry`]: saving "Duel"
/// replaces stored "duel".
pub trait ArenaStore {
    /// Stores `data`, replacing anything stored under the same name.
    async fn save(&self, data: &ArenaData) -> Result<(), StoreError>;

    /// Loads one arena. `Ok(None)` if nothing is stored under `name`.
    async fn load(&self, name: &str) -> Result<Option<ArenaData>, StoreError>;

    /// Loads every stored arena, ordered by name.
    async fn load_all(&self) -> Result<Vec<ArenaData>, StoreError>;

    /// Deletes one arena. `false` if nothing was stored under `name`.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;
}

/// Storage key for `name`.
pub(crate) fn storage_key(name: &str) -> Result<String, StoreError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name.to_lowercase())
}

/// Spawns every stored arena into `registry`, all sharing `host`.
///
/// Arenas whose name is already registered are skipped. Returns how many
/// were spawned.
pub async fn restore_all<S: ArenaStore>(
    store: &S,
    registry: &ArenaRegistry,
    host: Arc<dyn Host>,
) -> Result<usize, StoreError> {
    let mut spawned = 0;
    for data in store.load_all().await? {
        let arena = Arena::from_data(data, host.clone());
        match registry.spawn(arena) {
            Ok(_) => spawned += 1,
            Err(ArenaError::AlreadyExists(name)) => {
                tracing::warn!(arena = %name, "stored arena already registered, skipped");
            }
            Err(e) => tracing::warn!(error = %e, "stored arena not restored"),
        }
    }
    tracing::info!(arenas = spawned, "arenas restored");
    Ok(spawned)
}
