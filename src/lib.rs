//! Tabular Q-learning for tic-tac-toe
//!
//! This crate provides:
//! - The 3×3 board model and a step/reset environment with rewards
//! - A Q-learning agent with ε-greedy selection, online Bellman updates
//!   and versioned snapshots
//! - Training by self-play or against a random mover, with symmetric seat
//!   scheduling and a linear ε schedule
//! - Greedy evaluation and win/loss/draw statistics
//!
//! # Example
//!
//! ```
//! use ttt_qlearning::pipeline::{EvaluationConfig, TrainingConfig, evaluate_against_random, train};
//!
//! let config = TrainingConfig {
//!     episode_count: 200,
//!     seed: Some(1),
//!     log_interval: 0,
//!     ..TrainingConfig::default()
//! };
//! let mut agent = config.build_agent();
//! let result = train(&mut agent, &config)?;
//! assert_eq!(result.total_episodes, 200);
//!
//! let evaluation = evaluate_against_random(&agent, &EvaluationConfig::default())?;
//! assert_eq!(evaluation.episodes, 200);
//! # Ok::<(), ttt_qlearning::Error>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod tictactoe;

pub use environment::{Environment, StepOutcome};
pub use error::{Error, Result};
pub use q_learning::{AgentSnapshot, QLearningAgent};
pub use tictactoe::{BoardState, EpisodeOutcome, GameOutcome, Player};
