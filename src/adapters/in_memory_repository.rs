//! In-memory snapshot repository for testing.
//!
//! This adapter provides a pure in-memory implementation of SnapshotRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::AgentSnapshot};

/// In-memory repository for testing.
///
/// Snapshots are encoded to MessagePack bytes exactly like the file-backed
/// adapter, so decoding failures surface the same way.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use ttt_qlearning::{adapters::InMemoryRepository, q_learning::QLearningAgent};
///
/// let repo = InMemoryRepository::new();
/// let agent = QLearningAgent::default();
///
/// agent.save(&repo, Path::new("agent"))?;
/// let loaded = QLearningAgent::load(&repo, Path::new("agent"))?;
/// assert_eq!(loaded.stats(), agent.stats());
/// # Ok::<(), ttt_qlearning::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // a poisoned map is still structurally valid
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored snapshots.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a snapshot exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    /// Store raw bytes at `path`, bypassing encoding.
    ///
    /// Lets tests plant damaged snapshots.
    pub fn insert_raw(&self, path: &Path, bytes: Vec<u8>) {
        self.storage().insert(key(path), bytes);
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl SnapshotRepository for InMemoryRepository {
    fn save(&self, snapshot: &AgentSnapshot, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize snapshot for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<AgentSnapshot> {
        let storage = self.storage();

        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load snapshot from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::corrupt(format!("{path:?}: {e}")))
    }
}
