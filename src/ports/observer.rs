//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use crate::{
    Result,
    tictactoe::{BoardState, EpisodeOutcome, Player},
};

/// Summary of one finished training episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    /// Index of the episode (0-based)
    pub episode: usize,
    /// Seat the learning agent occupied
    pub agent_player: Player,
    /// Outcome from the learning agent's perspective
    pub outcome: EpisodeOutcome,
    /// Exploration rate in effect during the episode
    pub epsilon: f64,
    /// Every action played, starting with X
    pub moves: Vec<usize>,
    /// Number of entries in the agent's table after the episode
    pub q_table_size: usize,
}

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode, agent_player, epsilon)`
///    - `on_move(...)` - For each move in the episode
///    - `on_episode_end(report)`
/// 3. `on_training_end()` - Once at the end, also after an early stop
///
/// # Examples
///
/// ```no_run
/// use ttt_qlearning::ports::{EpisodeReport, Observer};
///
/// struct CountingObserver {
///     episodes: usize,
/// }
///
/// impl Observer for CountingObserver {
///     fn on_episode_end(&mut self, _report: &EpisodeReport) -> ttt_qlearning::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called before the first move of an episode.
    fn on_episode_start(
        &mut self,
        _episode: usize,
        _agent_player: Player,
        _epsilon: f64,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after each move is applied.
    ///
    /// # Parameters
    ///
    /// * `state` - Board state before the move
    /// * `action` - Position (0-8) that was played
    /// * `by_agent` - Whether the learning agent's seat made the move
    fn on_move(
        &mut self,
        _episode: usize,
        _state: &BoardState,
        _action: usize,
        _by_agent: bool,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches a terminal state.
    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
