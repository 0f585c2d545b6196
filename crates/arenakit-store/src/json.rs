//! Directory-of-JSON-files arena store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use arenakit_arena::ArenaData;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{ArenaStore, StoreError, storage_key};

/// Stores each arena as `<dir>/<name>.json`, with `name` lowercased.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-save leaves the previous version intact. Files that fail to
/// parse are skipped by [`load_all`](ArenaStore::load_all) with a warning
/// and reported as errors by [`load`](ArenaStore::load).
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// A store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.dir.join(format!("{}.json", storage_key(name)?)))
    }
}

impl ArenaStore for JsonDirStore {
    async fn save(&self, data: &ArenaData) -> Result<(), StoreError> {
        let path = self.path_for(data.name())?;
        let bytes = serde_json::to_vec_pretty(data)?;

        fs::create_dir_all(&self.dir).await?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(arena = %data.name(), path = %path.display(), bytes = bytes.len(), "arena saved");
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<ArenaData>, StoreError> {
        let path = self.path_for(name)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn load_all(&self) -> Result<Vec<ArenaData>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut arenas = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read(&path)
                .await
                .map_err(StoreError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<ArenaData>(&bytes)?));
            match parsed {
                Ok(data) => arenas.push(data),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable arena file"),
            }
        }

        arenas.sort_by_key(|data| data.name().to_lowercase());
        info!(dir = %self.dir.display(), arenas = arenas.len(), "arenas loaded");
        Ok(arenas)
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
