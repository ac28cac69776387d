//! Training and evaluation pipeline
//!
//! This module provides:
//! - The online training loop with ε scheduling and seat selection
//! - Greedy evaluation against a random mover
//! - Observers recording progress during training

pub mod evaluation;
pub mod observers;
pub mod random;
pub mod schedule;
pub mod tally;
pub mod training;

pub use evaluation::{EvaluationConfig, EvaluationResult, evaluate, evaluate_against_random};
// Re-export observer implementations (adapters)
pub use observers::{
    EpisodeRecord, IntervalLogger, JsonlObserver, MetricsObserver, MetricsSummary,
    ProgressObserver,
};
pub use random::RandomLearner;
pub use schedule::EpsilonSchedule;
pub use tally::OutcomeTally;
pub use training::{
    OpponentMode, SeatPolicy, StopSignal, TrainingConfig, TrainingPipeline, TrainingResult, train,
};

pub use crate::ports::{Learner, Observer};
