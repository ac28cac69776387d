//! Repository port for agent snapshot persistence.

use std::path::Path;

use crate::{Result, q_learning::AgentSnapshot};

/// Port for persisting and loading agent snapshots.
///
/// Implementations must be all-or-nothing: a failed save must not damage
/// a snapshot previously stored at the same location.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use ttt_qlearning::{
///     adapters::MsgPackRepository,
///     q_learning::QLearningAgent,
/// };
///
/// let agent = QLearningAgent::default();
/// let repo = MsgPackRepository::new();
/// agent.save(&repo, Path::new("agent.msgpack"))?;
/// let restored = QLearningAgent::load(&repo, Path::new("agent.msgpack"))?;
/// # Ok::<(), ttt_qlearning::Error>(())
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or encoding fails.
    fn save(&self, snapshot: &AgentSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the location cannot be read and
    /// [`crate::Error::CorruptSnapshot`] if the bytes do not decode into a
    /// snapshot.
    fn load(&self, path: &Path) -> Result<AgentSnapshot>;
}
