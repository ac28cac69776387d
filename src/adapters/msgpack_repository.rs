//! MessagePack implementation of the snapshot repository.
//!
//! This adapter implements the SnapshotRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::AgentSnapshot};

/// MessagePack-based snapshot repository.
///
/// Writes go to a temporary file in the target's directory which is then
/// renamed over the target, so an interrupted save never leaves a
/// half-written snapshot behind.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use ttt_qlearning::{
///     adapters::MsgPackRepository,
///     ports::SnapshotRepository,
///     q_learning::{AgentSnapshot, QLearningAgent, TrainingMetadata},
/// };
///
/// let repo = MsgPackRepository;
/// let snapshot = AgentSnapshot::from_agent(&QLearningAgent::default(), TrainingMetadata::default());
///
/// repo.save(&snapshot, Path::new("trained.msgpack"))?;
/// let loaded = repo.load(Path::new("trained.msgpack"))?;
/// # Ok::<(), ttt_qlearning::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackRepository {
    fn save(&self, snapshot: &AgentSnapshot, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
            operation: format!("create temporary file in {dir:?}"),
            source,
        })?;

        let mut writer = BufWriter::new(temp);
        rmp_serde::encode::write_named(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize snapshot to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("write snapshot for {path:?}"),
            source,
        })?;

        let temp = writer.into_inner().map_err(|e| Error::Io {
            operation: format!("flush snapshot for {path:?}"),
            source: e.into_error(),
        })?;
        temp.persist(path).map_err(|e| Error::Io {
            operation: format!("replace {path:?}"),
            source: e.error,
        })?;

        log::debug!("wrote {} snapshot entries to {path:?}", snapshot.entries.len());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<AgentSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot = rmp_serde::decode::from_read(BufReader::new(file))
            .map_err(|e| Error::corrupt(format!("{path:?}: {e}")))?;

        Ok(snapshot)
    }
}
