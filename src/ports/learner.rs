//! Learner port - abstraction over anything that can pick a move
//!
//! Both the Q-learning agent and the random baseline implement this trait,
//! so presentation code and the evaluation loop can treat them alike.

use crate::{Result, tictactoe::BoardState};

/// Move-selection interface shared by trained agents and baselines
///
/// # Examples
///
/// ```
/// use ttt_qlearning::{
///     pipeline::RandomLearner,
///     ports::Learner,
///     tictactoe::BoardState,
/// };
///
/// let mut mover = RandomLearner::with_seed("Random".to_string(), 7);
/// let state = BoardState::initial();
/// let action = mover.select_move(&state, &state.legal_actions(), false)?;
/// assert!(action < 9);
/// # Ok::<(), ttt_qlearning::Error>(())
/// ```
pub trait Learner: Send {
    /// Select an action among `legal_actions` for `state`.
    ///
    /// `training` enables exploration for learners that have it; with
    /// `training == false` a learner must play its best known move.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalActions`] when `legal_actions` is empty.
    fn select_move(
        &mut self,
        state: &BoardState,
        legal_actions: &[usize],
        training: bool,
    ) -> Result<usize>;

    /// Get the learner's name.
    ///
    /// Used for identification in logs and summaries.
    fn name(&self) -> &str;

    /// Seed the learner's internal random number generator.
    ///
    /// Training pipelines call this when given a deterministic seed.
    /// Stateless learners can ignore it.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }
}
