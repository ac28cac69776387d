//! Uniform random opponent

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{Error, Result, ports::Learner, tictactoe::BoardState};

/// Random policy learner
///
/// Picks uniformly among the legal actions it is offered and never learns.
#[derive(Debug, Clone)]
pub struct RandomLearner {
    name: String,
    rng: StdRng,
}

impl RandomLearner {
    /// Create a new random learner
    pub fn new(name: String) -> Self {
        Self {
            name,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Create a new random learner with a deterministic seed
    pub fn with_seed(name: String, seed: u64) -> Self {
        Self {
            name,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLearner {
    fn default() -> Self {
        Self::new("Random".to_string())
    }
}

impl Learner for RandomLearner {
    fn select_move(
        &mut self,
        _state: &BoardState,
        legal_actions: &[usize],
        _training: bool,
    ) -> Result<usize> {
        if legal_actions.is_empty() {
            return Err(Error::NoLegalActions);
        }
        let index = self.rng.random_range(0..legal_actions.len());
        Ok(legal_actions[index])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}
