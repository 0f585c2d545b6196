//! In-memory arena store.

use std::collections::BTreeMap;

use arenakit_arena::ArenaData;
use parking_lot::Mutex;

use crate::{ArenaStore, StoreError, storage_key};

/// Keeps arena data in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    arenas: Mutex<BTreeMap<String, ArenaData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arenas.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.lock().is_empty()
    }
}

impl ArenaStore for MemoryStore {
    async fn save(&self, data: &ArenaData) -> Result<(), StoreError> {
        let key = storage_key(data.name())?;
        self.arenas.lock().insert(key, data.clone());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<ArenaData>, StoreError> {
        let key = storage_key(name)?;
        Ok(self.arenas.lock().get(&key).cloned())
    }

    async fn load_all(&self) -> Result<Vec<ArenaData>, StoreError> {
        Ok(self.arenas.lock().values().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let key = storage_key(name)?;
        Ok(self.arenas.lock().remove(&key).is_some())
    }
}
