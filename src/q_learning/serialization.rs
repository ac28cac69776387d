//! Serialization support for Q-learning agents.
//!
//! Snapshots store the table as a flat, sorted list of entries keyed by the
//! textual board encoding, so the persisted layout does not depend on the
//! in-memory map representation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::{agent::QLearningAgent, q_table::QTable},
    tictactoe::{BoardState, Player},
};

/// Description of how an agent was trained
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of episodes in the run that produced the snapshot
    pub episodes: Option<usize>,
    /// Opponent trained against
    pub opponent: Option<String>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Fixed seat the agent trained in, `None` when seats varied
    pub agent_player: Option<Player>,
    /// Win rate over the run
    pub win_rate: Option<f64>,
}

/// One stored Q-value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Nine-character board encoding, e.g. `"X.O......"`
    pub state: String,
    pub action: usize,
    pub value: f64,
}

/// Versioned, self-describing record of a trained agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub version: u32,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub training_episodes: usize,
    pub metadata: TrainingMetadata,
    /// Entries sorted by (state, action)
    pub entries: Vec<SnapshotEntry>,
}

impl AgentSnapshot {
    /// Current save format version
    pub const VERSION: u32 = 1;

    /// Capture the full learned state of `agent`
    pub fn from_agent(agent: &QLearningAgent, metadata: TrainingMetadata) -> Self {
        let mut entries: Vec<SnapshotEntry> = agent
            .q_table()
            .entries()
            .map(|(state, action, value)| SnapshotEntry {
                state: state.encode(),
                action,
                value,
            })
            .collect();
        entries.sort_by(|a, b| a.state.cmp(&b.state).then(a.action.cmp(&b.action)));

        Self {
            version: Self::VERSION,
            learning_rate: agent.learning_rate(),
            discount_factor: agent.discount_factor(),
            epsilon: agent.epsilon(),
            training_episodes: agent.training_episodes(),
            metadata,
            entries,
        }
    }

    /// Rebuild an agent, validating every field
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedSnapshotVersion`] for an unknown version and
    /// [`Error::CorruptSnapshot`] for out-of-range hyperparameters,
    /// unparsable states, actions outside `0..9`, non-finite values or
    /// duplicate entries.
    pub fn to_agent(&self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::corrupt(format!(
                "learning rate {} outside (0, 1]",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(Error::corrupt(format!(
                "discount factor {} outside [0, 1]",
                self.discount_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::corrupt(format!(
                "epsilon {} outside [0, 1]",
                self.epsilon
            )));
        }

        let mut q_table = QTable::new(self.learning_rate, self.discount_factor);
        let mut seen = HashSet::with_capacity(self.entries.len());

        for entry in &self.entries {
            let state = BoardState::from_string(&entry.state)
                .map_err(|e| Error::corrupt(format!("state '{}': {e}", entry.state)))?;
            if entry.action >= 9 {
                return Err(Error::corrupt(format!(
                    "action {} out of range for state '{}'",
                    entry.action, entry.state
                )));
            }
            if !entry.value.is_finite() {
                return Err(Error::corrupt(format!(
                    "non-finite value for state '{}' action {}",
                    entry.state, entry.action
                )));
            }
            if !seen.insert((state, entry.action)) {
                return Err(Error::corrupt(format!(
                    "duplicate entry for state '{}' action {}",
                    entry.state, entry.action
                )));
            }
            q_table.set(state, entry.action, entry.value)?;
        }

        Ok(QLearningAgent::from_parts(
            q_table,
            self.epsilon,
            self.training_episodes,
        ))
    }
}
