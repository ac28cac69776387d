//! Greedy evaluation of a trained agent

use serde::{Deserialize, Serialize};

use super::{random::RandomLearner, tally::OutcomeTally};
use crate::{
    Result,
    environment::Environment,
    ports::Learner,
    q_learning::QLearningAgent,
    tictactoe::{GameOutcome, Player},
};

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of evaluation episodes
    pub episodes: usize,
    /// Seat the agent plays
    pub agent_player: Player,
    /// Seed for the opponent
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            episodes: 200,
            agent_player: Player::X,
            seed: None,
        }
    }
}

/// Result of an evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub episodes: usize,
    pub agent_player: Player,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub draw_rate: f64,
}

impl EvaluationResult {
    fn new(agent_player: Player, tally: OutcomeTally) -> Self {
        Self {
            episodes: tally.total(),
            agent_player,
            wins: tally.wins,
            losses: tally.losses,
            draws: tally.draws,
            win_rate: tally.win_rate(),
            loss_rate: tally.loss_rate(),
            draw_rate: tally.draw_rate(),
        }
    }
}

/// Play `config.episodes` games of greedy `agent` against `opponent`
///
/// The agent is borrowed immutably: it never explores and its table is
/// never written.
pub fn evaluate(
    agent: &QLearningAgent,
    opponent: &mut dyn Learner,
    config: &EvaluationConfig,
) -> Result<EvaluationResult> {
    if let Some(seed) = config.seed {
        opponent.set_rng_seed(seed)?;
    }

    let mut tally = OutcomeTally::new();
    let mut env = Environment::new();

    for _ in 0..config.episodes {
        env.reset();
        while !env.is_done() {
            let state = env.state();
            let legal = env.legal_actions();
            let action = if env.current_player() == config.agent_player {
                agent.greedy_action(&state, &legal)?
            } else {
                opponent.select_move(&state, &legal, false)?
            };
            env.step(action)?;
        }

        let outcome = match env.winner() {
            Some(winner) => GameOutcome::Win(winner),
            None => GameOutcome::Draw,
        };
        tally.record(outcome.for_player(config.agent_player));
    }

    let result = EvaluationResult::new(config.agent_player, tally);
    log::info!(
        "evaluation as {} vs {}: {} episodes, win rate {:.3}, draw rate {:.3}, loss rate {:.3}",
        config.agent_player,
        opponent.name(),
        result.episodes,
        result.win_rate,
        result.draw_rate,
        result.loss_rate,
    );
    Ok(result)
}

/// Evaluate `agent` against a fresh [`RandomLearner`]
pub fn evaluate_against_random(
    agent: &QLearningAgent,
    config: &EvaluationConfig,
) -> Result<EvaluationResult> {
    let mut opponent = RandomLearner::new("Random".to_string());
    evaluate(agent, &mut opponent, config)
}
