//! Arena registry: tracks running arenas by name and routes host events.

use arenakit_types::ParticipantId;
use futures_util::future::join_all;
use indexmap::IndexMap;
use indexmap::map::Entry;
use parking_lot::RwLock;

use crate::{Arena, ArenaError, ArenaHandle, ArenaInfo, JoinOutcome};

/// Lookup key for a name. Names are case-insensitive.
fn key(name: &str) -> String {
    name.to_lowercase()
}

/// All known arenas, by case-insensitive name, in registration order.
///
/// Shared by reference (usually in an `Arc`); every method takes `&self`.
/// The lock is only held for map operations, never across an `.await`.
#[derive(Debug, Default)]
pub struct ArenaRegistry {
    arenas: RwLock<IndexMap<String, ArenaHandle>>,
}

impl ArenaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a running arena. `false` if the name is taken.
    pub fn add(&self, arena: ArenaHandle) -> bool {
        let mut arenas = self.arenas.write();
        match arenas.entry(key(arena.name())) {
            Entry::Occupied(_) => {
                tracing::debug!(arena = %arena.name(), "arena name taken, not registered");
                false
            }
            Entry::Vacant(slot) => {
                tracing::info!(arena = %arena.name(), "arena registered");
                slot.insert(arena);
                true
            }
        }
    }

    /// Spawns `arena` on its own task and registers it.
    ///
    /// The name is checked before spawning, so a duplicate never starts a
    /// task.
    pub fn spawn(&self, arena: Arena) -> Result<ArenaHandle, ArenaError> {
        let mut arenas = self.arenas.write();
        match arenas.entry(key(arena.name())) {
            Entry::Occupied(_) => Err(ArenaError::AlreadyExists(arena.name().to_string())),
            Entry::Vacant(slot) => {
                let handle = ArenaHandle::spawn(arena);
                tracing::info!(arena = %handle.name(), "arena spawned");
                Ok(slot.insert(handle).clone())
            }
        }
    }

    /// Unregisters an arena. `false` if there was none by that name.
    ///
    /// The arena keeps running while other handles to it exist; use
    /// [`destroy`](Self::destroy) to stop it.
    pub fn remove(&self, name: &str) -> bool {
        self.take(name).is_some()
    }

    /// Unregisters an arena and returns its handle.
    pub fn take(&self, name: &str) -> Option<ArenaHandle> {
        let removed = self.arenas.write().shift_remove(&key(name));
        if let Some(handle) = &removed {
            tracing::info!(arena = %handle.name(), "arena unregistered");
        }
        removed
    }

    /// Unregisters an arena and stops its task.
    pub async fn destroy(&self, name: &str) -> Result<(), ArenaError> {
        let handle = self
            .take(name)
            .ok_or_else(|| ArenaError::NotFound(name.to_string()))?;
        // Already stopped is as good as stopped.
        let _ = handle.shutdown().await;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ArenaHandle> {
        self.arenas.read().get(&key(name)).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.arenas.read().contains_key(&key(name))
    }

    /// Handles to every arena, in registration order.
    pub fn arenas(&self) -> Vec<ArenaHandle> {
        self.arenas.read().values().cloned().collect()
    }

    /// Arena names as they were registered.
    pub fn names(&self) -> Vec<String> {
        self.arenas
            .read()
            .values()
            .map(|handle| handle.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arenas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.read().is_empty()
    }

    /// Joins `participant` to the named arena.
    pub async fn join(
        &self,
        name: &str,
        participant: impl Into<ParticipantId>,
    ) -> Result<JoinOutcome, ArenaError> {
        let handle = self
            .get(name)
            .ok_or_else(|| ArenaError::NotFound(name.to_string()))?;
        handle.join(participant).await
    }

    /// Removes `participant` from the named arena.
    pub async fn leave(
        &self,
        name: &str,
        participant: impl Into<ParticipantId>,
    ) -> Result<bool, ArenaError> {
        let handle = self
            .get(name)
            .ok_or_else(|| ArenaError::NotFound(name.to_string()))?;
        handle.leave(participant).await
    }

    /// Tells every arena that `participant` connected to the host. Arenas
    /// with `auto_trigger_on_membership` treat it as a join.
    pub async fn participant_connected(&self, participant: &ParticipantId) {
        let arenas = self.arenas();
        let results = join_all(
            arenas
                .iter()
                .map(|arena| arena.connected(participant.clone())),
        )
        .await;
        log_unreachable(&arenas, results, "connect");
    }

    /// Tells every arena that `participant` left the host. Arenas with
    /// `auto_trigger_on_membership` treat it as a leave.
    pub async fn participant_disconnected(&self, participant: &ParticipantId) {
        let arenas = self.arenas();
        let results = join_all(
            arenas
                .iter()
                .map(|arena| arena.disconnected(participant.clone())),
        )
        .await;
        log_unreachable(&arenas, results, "disconnect");
    }

    /// Info for every reachable arena, in registration order.
    pub async fn list(&self) -> Vec<ArenaInfo> {
        let arenas = self.arenas();
        join_all(arenas.iter().map(|arena| arena.info()))
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }

    /// Stops every arena and empties the registry.
    pub async fn shutdown_all(&self) {
        let arenas: Vec<ArenaHandle> = self.arenas.write().drain(..).map(|(_, h)| h).collect();
        join_all(arenas.iter().map(|arena| arena.shutdown())).await;
        tracing::info!(arenas = arenas.len(), "all arenas shut down");
    }
}

fn log_unreachable(arenas: &[ArenaHandle], results: Vec<Result<(), ArenaError>>, event: &str) {
    for (arena, result) in arenas.iter().zip(results) {
        if let Err(e) = result {
            tracing::warn!(arena = %arena.name(), error = %e, event, "host event not delivered");
        }
    }
}
