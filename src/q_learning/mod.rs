//! Tabular Q-learning
//!
//! Temporal difference control with a lookup table: every (board, action)
//! pair has its own value estimate, updated online with the Bellman rule
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α [r + γ max_a' Q(s',a') − Q(s,a)]
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use ttt_qlearning::{q_learning::QLearningAgent, tictactoe::BoardState};
//!
//! let mut agent = QLearningAgent::new(
//!     0.2,  // learning_rate
//!     0.95, // discount_factor
//! )
//! .with_seed(42);
//!
//! let state = BoardState::initial();
//! let action = agent.select_action(&state, &state.legal_actions(), true)?;
//! assert!(action < 9);
//! # Ok::<(), ttt_qlearning::Error>(())
//! ```

pub mod agent;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use agent::{AgentStats, DEFAULT_EPSILON, QLearningAgent};
pub use q_table::{DEFAULT_DISCOUNT_FACTOR, DEFAULT_LEARNING_RATE, QTable, UNSEEN_Q_VALUE};
pub use serialization::{AgentSnapshot, SnapshotEntry, TrainingMetadata};
