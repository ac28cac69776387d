//! Q-table implementation for temporal difference learning

use std::collections::{BTreeMap, HashMap};

use crate::{Error, Result, tictactoe::BoardState};

/// Value returned for every (state, action) pair that has never been written
pub const UNSEEN_Q_VALUE: f64 = 0.0;

/// Learning rate used when none is configured
pub const DEFAULT_LEARNING_RATE: f64 = 0.2;

/// Discount factor used when none is configured
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.95;

/// Q-table mapping states to per-action value estimates
///
/// Entries are created lazily by [`QTable::set`] and the update rules;
/// reads of absent pairs return [`UNSEEN_Q_VALUE`].
#[derive(Debug, Clone)]
pub struct QTable {
    /// Q-values: state -> action -> Q-value
    q_values: HashMap<BoardState, BTreeMap<usize, f64>>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a new Q-table
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &BoardState, action: usize) -> f64 {
        self.q_values
            .get(state)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(UNSEEN_Q_VALUE)
    }

    /// Set Q-value for a state-action pair
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMove`] for an action outside the board and
    /// [`Error::NonFiniteValue`] for NaN or infinite values. Neither could
    /// be restored from a snapshot.
    pub fn set(&mut self, state: BoardState, action: usize, value: f64) -> Result<()> {
        if action >= 9 {
            return Err(Error::InvalidMove { position: action });
        }
        if !value.is_finite() {
            return Err(Error::NonFiniteValue { action, value });
        }
        self.q_values.entry(state).or_default().insert(action, value);
        Ok(())
    }

    /// Whether the pair has been written at least once
    pub fn contains(&self, state: &BoardState, action: usize) -> bool {
        self.q_values
            .get(state)
            .is_some_and(|actions| actions.contains_key(&action))
    }

    /// Maximum Q-value over legal actions, `0.0` when there are none
    pub fn max_q(&self, state: &BoardState, legal_actions: &[usize]) -> f64 {
        legal_actions
            .iter()
            .map(|&action| self.get(state, action))
            .reduce(f64::max)
            .unwrap_or(UNSEEN_Q_VALUE)
    }

    /// Greedy action (highest Q-value); ties go to the lowest action index
    pub fn greedy_action(&self, state: &BoardState, legal_actions: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &action in legal_actions {
            let q = self.get(state, action);
            best = match best {
                Some((best_action, best_q))
                    if q < best_q || (q == best_q && best_action < action) =>
                {
                    Some((best_action, best_q))
                }
                _ => Some((action, q)),
            };
        }
        best.map(|(action, _)| action)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// When `done` the target is the reward alone. The table is left
    /// untouched if the new value cannot be stored (see [`QTable::set`]).
    pub fn q_learning_update(
        &mut self,
        state: BoardState,
        action: usize,
        reward: f64,
        next_state: &BoardState,
        next_legal_actions: &[usize],
        done: bool,
    ) -> Result<()> {
        let current_q = self.get(&state, action);
        let td_target = if done {
            reward
        } else {
            reward + self.discount_factor * self.max_q(next_state, next_legal_actions)
        };
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.set(state, action, new_q)
    }

    /// Iterate over every stored `(state, action, value)` triple
    pub fn entries(&self) -> impl Iterator<Item = (&BoardState, usize, f64)> {
        self.q_values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(&action, &value)| (state, action, value))
        })
    }

    /// Number of distinct states with at least one stored value
    pub fn state_count(&self) -> usize {
        self.q_values.len()
    }

    /// Reset all Q-values
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.values().map(BTreeMap::len).sum()
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE, DEFAULT_DISCOUNT_FACTOR)
    }
}
