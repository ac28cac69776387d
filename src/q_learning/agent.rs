//! Q-learning agent
//!
//! The agent owns a [`QTable`], an exploration rate and a seedable random
//! number generator. It learns one transition at a time through
//! [`QLearningAgent::update`]; the training pipeline decides which
//! transitions to feed it.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Learner, SnapshotRepository},
    q_learning::{
        q_table::{DEFAULT_DISCOUNT_FACTOR, DEFAULT_LEARNING_RATE, QTable},
        serialization::{AgentSnapshot, TrainingMetadata},
    },
    tictactoe::BoardState,
};

/// Exploration rate of a freshly created agent
pub const DEFAULT_EPSILON: f64 = 1.0;

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Summary statistics for an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Number of stored (state, action) values
    pub q_table_size: usize,
    /// Number of distinct states with a stored value
    pub state_count: usize,
    pub epsilon: f64,
    pub training_episodes: usize,
}

/// Q-learning agent (off-policy TD control)
///
/// Learns the optimal Q* function by always updating toward the maximum
/// next-state value, regardless of the action actually taken next.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
    training_episodes: usize,
}

impl QLearningAgent {
    /// Create a new Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - α parameter (0.0 to 1.0)
    /// * `discount_factor` - γ parameter (0.0 to 1.0)
    ///
    /// The exploration rate starts at [`DEFAULT_EPSILON`].
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_table: QTable::new(learning_rate, discount_factor),
            epsilon: DEFAULT_EPSILON,
            rng: build_rng(None),
            rng_seed: None,
            training_episodes: 0,
        }
    }

    /// Reseed the agent's random number generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    pub(crate) fn from_parts(q_table: QTable, epsilon: f64, training_episodes: usize) -> Self {
        Self {
            q_table,
            epsilon: epsilon.clamp(0.0, 1.0),
            rng: build_rng(None),
            rng_seed: None,
            training_episodes,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate, clamped to `[0, 1]`
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = if epsilon.is_nan() {
            0.0
        } else {
            epsilon.clamp(0.0, 1.0)
        };
    }

    pub fn learning_rate(&self) -> f64 {
        self.q_table.learning_rate()
    }

    pub fn discount_factor(&self) -> f64 {
        self.q_table.discount_factor()
    }

    pub fn training_episodes(&self) -> usize {
        self.training_episodes
    }

    /// Count one completed training episode
    pub fn record_episode(&mut self) {
        self.training_episodes += 1;
    }

    /// ε-greedy action selection
    ///
    /// With `training` set, a uniformly random legal action is taken with
    /// probability ε; otherwise the greedy action is played.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] when `legal_actions` is empty.
    pub fn select_action(
        &mut self,
        state: &BoardState,
        legal_actions: &[usize],
        training: bool,
    ) -> Result<usize> {
        if legal_actions.is_empty() {
            return Err(Error::NoLegalActions);
        }

        if training && self.rng.random::<f64>() < self.epsilon {
            // Explore: random action
            legal_actions
                .choose(&mut self.rng)
                .copied()
                .ok_or(Error::NoLegalActions)
        } else {
            self.greedy_action(state, legal_actions)
        }
    }

    /// Highest-valued legal action; ties go to the lowest index
    ///
    /// Never explores and never touches the table, so it is safe to call
    /// through a shared reference during evaluation.
    pub fn greedy_action(&self, state: &BoardState, legal_actions: &[usize]) -> Result<usize> {
        self.q_table
            .greedy_action(state, legal_actions)
            .ok_or(Error::NoLegalActions)
    }

    /// Apply one Bellman update for the transition `(state, action) -> next_state`
    ///
    /// `next_done` marks `next_state` as terminal, in which case the target
    /// is `reward` alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMove`] when `action` is not a board cell and
    /// [`Error::NonFiniteValue`] when the updated value is NaN or infinite.
    /// The table is unchanged in both cases.
    pub fn update(
        &mut self,
        state: BoardState,
        action: usize,
        reward: f64,
        next_state: &BoardState,
        next_legal_actions: &[usize],
        next_done: bool,
    ) -> Result<()> {
        self.q_table.q_learning_update(
            state,
            action,
            reward,
            next_state,
            next_legal_actions,
            next_done,
        )
    }

    pub fn q_value(&self, state: &BoardState, action: usize) -> f64 {
        self.q_table.get(state, action)
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            q_table_size: self.q_table.size(),
            state_count: self.q_table.state_count(),
            epsilon: self.epsilon,
            training_episodes: self.training_episodes,
        }
    }

    /// Forget everything learned and restore the initial exploration rate
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.epsilon = DEFAULT_EPSILON;
        self.training_episodes = 0;
        self.rng = build_rng(self.rng_seed);
    }

    /// Persist the agent through `repository`
    pub fn save<R: SnapshotRepository + ?Sized>(&self, repository: &R, path: &Path) -> Result<()> {
        self.save_with_metadata(repository, path, TrainingMetadata::default())
    }

    /// Persist the agent together with a description of how it was trained
    pub fn save_with_metadata<R: SnapshotRepository + ?Sized>(
        &self,
        repository: &R,
        path: &Path,
        metadata: TrainingMetadata,
    ) -> Result<()> {
        let snapshot = AgentSnapshot::from_agent(self, metadata);
        repository.save(&snapshot, path)?;
        log::debug!(
            "saved agent with {} Q-values to {}",
            snapshot.entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Restore an agent previously written with [`QLearningAgent::save`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptSnapshot`] or
    /// [`Error::UnsupportedSnapshotVersion`] when the stored data is not a
    /// valid snapshot.
    pub fn load<R: SnapshotRepository + ?Sized>(repository: &R, path: &Path) -> Result<Self> {
        let snapshot = repository.load(path)?;
        let agent = snapshot.to_agent()?;
        log::debug!(
            "loaded agent with {} Q-values from {}",
            agent.q_table.size(),
            path.display()
        );
        Ok(agent)
    }
}

impl Default for QLearningAgent {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE, DEFAULT_DISCOUNT_FACTOR)
    }
}

impl Learner for QLearningAgent {
    fn select_move(
        &mut self,
        state: &BoardState,
        legal_actions: &[usize],
        training: bool,
    ) -> Result<usize> {
        self.select_action(state, legal_actions, training)
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.reseed(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(s: &str) -> BoardState {
        BoardState::from_string(s).unwrap()
    }

    #[test]
    fn test_defaults() {
        let agent = QLearningAgent::default();
        assert_eq!(agent.learning_rate(), 0.2);
        assert_eq!(agent.discount_factor(), 0.95);
        assert_eq!(agent.epsilon(), 1.0);
        assert_eq!(agent.training_episodes(), 0);
        assert_eq!(agent.stats().q_table_size, 0);
    }

    #[test]
    fn test_set_epsilon_clamps() {
        let mut agent = QLearningAgent::default();
        agent.set_epsilon(1.5);
        assert_eq!(agent.epsilon(), 1.0);
        agent.set_epsilon(-0.1);
        assert_eq!(agent.epsilon(), 0.0);
        agent.set_epsilon(0.3);
        assert_eq!(agent.epsilon(), 0.3);
    }

    #[test]
    fn test_empty_legal_actions_is_an_error() {
        let mut agent = QLearningAgent::default().with_seed(1);
        let full = state("XOXXOOOXX");
        assert!(matches!(
            agent.select_action(&full, &[], true),
            Err(Error::NoLegalActions)
        ));
        assert!(matches!(
            agent.greedy_action(&full, &[]),
            Err(Error::NoLegalActions)
        ));
    }

    #[test]
    fn test_untrained_greedy_picks_lowest_index() {
        let mut agent = QLearningAgent::default().with_seed(3);
        let s = state("X...O....");
        let legal = s.legal_actions();
        assert_eq!(agent.select_action(&s, &legal, false).unwrap(), 1);
    }

    #[test]
    fn test_exploration_only_when_training() {
        let mut agent = QLearningAgent::default().with_seed(5);
        let empty = BoardState::initial();
        let legal = empty.legal_actions();
        agent.update(empty, 8, 1.0, &empty, &[], true).unwrap();

        // ε = 1 but training disabled: always greedy
        for _ in 0..50 {
            assert_eq!(agent.select_action(&empty, &legal, false).unwrap(), 8);
        }

        // ε = 1 and training: every action is eventually tried
        let mut seen = [false; 9];
        for _ in 0..500 {
            seen[agent.select_action(&empty, &legal, true).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_zero_epsilon_training_is_greedy() {
        let mut agent = QLearningAgent::default().with_seed(9);
        agent.set_epsilon(0.0);
        let empty = BoardState::initial();
        agent.update(empty, 2, 1.0, &empty, &[], true).unwrap();
        for _ in 0..50 {
            assert_eq!(
                agent
                    .select_action(&empty, &empty.legal_actions(), true)
                    .unwrap(),
                2
            );
        }
    }

    #[test]
    fn test_update_converges_monotonically() {
        let mut agent = QLearningAgent::new(0.2, 0.9);
        let s = BoardState::initial();
        let next = state("X...O....");
        agent.update(next, 1, 1.0, &next, &[], true).unwrap();
        let target = 0.5 + 0.9 * agent.q_value(&next, 1);

        let mut previous_gap = (target - agent.q_value(&s, 4)).abs();
        for _ in 0..100 {
            agent.update(s, 4, 0.5, &next, &next.legal_actions(), false).unwrap();
            let gap = (target - agent.q_value(&s, 4)).abs();
            assert!(gap < previous_gap);
            previous_gap = gap;
        }
        assert!(previous_gap < 1e-6);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = QLearningAgent::default().with_seed(42);
        let mut b = QLearningAgent::default().with_seed(42);
        let empty = BoardState::initial();
        let legal = empty.legal_actions();
        for _ in 0..20 {
            assert_eq!(
                a.select_action(&empty, &legal, true).unwrap(),
                b.select_action(&empty, &legal, true).unwrap()
            );
        }
    }

    #[test]
    fn test_reset_clears_learning() {
        let mut agent = QLearningAgent::default().with_seed(1);
        let empty = BoardState::initial();
        agent.update(empty, 0, 1.0, &empty, &[], true).unwrap();
        agent.record_episode();
        agent.set_epsilon(0.1);

        agent.reset();
        let stats = agent.stats();
        assert_eq!(stats.q_table_size, 0);
        assert_eq!(stats.training_episodes, 0);
        assert_eq!(stats.epsilon, DEFAULT_EPSILON);
    }

    #[test]
    fn test_learner_port_delegates() {
        let mut agent = QLearningAgent::default();
        agent.set_rng_seed(11).unwrap();
        let empty = BoardState::initial();
        agent.update(empty, 6, 0.7, &empty, &[], true).unwrap();
        let learner: &mut dyn Learner = &mut agent;
        assert_eq!(learner.name(), "Q-Learning");
        assert_eq!(
            learner
                .select_move(&empty, &empty.legal_actions(), false)
                .unwrap(),
            6
        );
    }

    #[test]
    fn test_out_of_range_update_is_rejected_and_snapshot_stays_loadable() {
        use crate::adapters::InMemoryRepository;

        let mut agent = QLearningAgent::default();
        let empty = BoardState::initial();
        assert!(matches!(
            agent.update(empty, 9, 1.0, &empty, &[], true),
            Err(Error::InvalidMove { position: 9 })
        ));
        assert!(matches!(
            agent.update(empty, 0, f64::NAN, &empty, &[], true),
            Err(Error::NonFiniteValue { .. })
        ));
        assert_eq!(agent.stats().q_table_size, 0);

        agent.update(empty, 4, 1.0, &empty, &[], true).unwrap();
        let repo = InMemoryRepository::new();
        let path = Path::new("agent");
        agent.save(&repo, path).unwrap();
        let restored = QLearningAgent::load(&repo, path).unwrap();
        assert_eq!(restored.q_value(&empty, 4), agent.q_value(&empty, 4));
        assert_eq!(restored.stats().q_table_size, 1);
    }
}
