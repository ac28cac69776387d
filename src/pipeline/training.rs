//! Training pipeline for the Q-learning agent

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    observers::IntervalLogger, random::RandomLearner, schedule::EpsilonSchedule,
    tally::OutcomeTally,
};
use crate::{
    Error, Result,
    environment::Environment,
    ports::{EpisodeReport, Learner, Observer},
    q_learning::{
        DEFAULT_DISCOUNT_FACTOR, DEFAULT_LEARNING_RATE, QLearningAgent, TrainingMetadata,
    },
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Who plays the seat the learner does not occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpponentMode {
    /// The agent itself, exploring with the current ε
    #[default]
    SelfPlay,
    /// A uniform random mover
    Random,
}

impl OpponentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OpponentMode::SelfPlay => "self-play",
            OpponentMode::Random => "random",
        }
    }
}

/// Which seat the learner takes each episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatPolicy {
    /// X or O with equal probability
    #[default]
    Random,
    /// X on even episodes, O on odd ones
    Alternate,
    /// Always X
    X,
    /// Always O
    O,
}

impl SeatPolicy {
    fn seat_for<R: Rng>(self, episode: usize, rng: &mut R) -> Player {
        match self {
            SeatPolicy::Random => {
                if rng.random_bool(0.5) {
                    Player::X
                } else {
                    Player::O
                }
            }
            SeatPolicy::Alternate => {
                if episode.is_multiple_of(2) {
                    Player::X
                } else {
                    Player::O
                }
            }
            SeatPolicy::X => Player::X,
            SeatPolicy::O => Player::O,
        }
    }

    /// The seat every episode uses, if the policy never switches
    pub fn fixed_seat(self) -> Option<Player> {
        match self {
            SeatPolicy::X => Some(Player::X),
            SeatPolicy::O => Some(Player::O),
            SeatPolicy::Random | SeatPolicy::Alternate => None,
        }
    }
}

/// Training configuration
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episode_count: usize,

    /// ε on the first episode
    pub epsilon_start: f64,

    /// ε on the last episode
    pub epsilon_end: f64,

    /// Learning rate α
    pub alpha: f64,

    /// Discount factor γ
    pub gamma: f64,

    pub opponent_mode: OpponentMode,

    pub seat: SeatPolicy,

    /// Random seed
    pub seed: Option<u64>,

    /// Episodes between progress log lines and win-rate samples, zero
    /// disables both
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episode_count: 5000,
            epsilon_start: 1.0,
            epsilon_end: 0.05,
            alpha: DEFAULT_LEARNING_RATE,
            gamma: DEFAULT_DISCOUNT_FACTOR,
            opponent_mode: OpponentMode::SelfPlay,
            seat: SeatPolicy::Random,
            seed: None,
            log_interval: 1000,
        }
    }
}

impl TrainingConfig {
    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open training config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every hyperparameter is in range
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });

        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return invalid(format!("alpha must be in (0, 1], got {}", self.alpha));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return invalid(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_end) {
            return invalid(format!(
                "epsilon_end must be in [0, 1], got {}",
                self.epsilon_end
            ));
        }
        Ok(())
    }

    pub fn schedule(&self) -> EpsilonSchedule {
        EpsilonSchedule::linear(self.epsilon_start, self.epsilon_end)
    }

    /// Fresh agent built from α, γ and the seed
    pub fn build_agent(&self) -> QLearningAgent {
        let mut agent = QLearningAgent::new(self.alpha, self.gamma);
        if let Some(seed) = self.seed {
            agent = agent.with_seed(seed);
        }
        agent.set_epsilon(self.epsilon_start);
        agent
    }

    /// Metadata describing a run with this configuration
    pub fn metadata(&self, result: &TrainingResult) -> TrainingMetadata {
        TrainingMetadata {
            episodes: Some(result.total_episodes),
            opponent: Some(self.opponent_mode.as_str().to_string()),
            seed: self.seed,
            agent_player: self.seat.fixed_seat(),
            win_rate: Some(result.win_rate),
        }
    }
}

/// Cooperative cancellation flag, checked between episodes
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop after the current episode
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes played
    pub total_episodes: usize,

    pub wins: usize,
    pub losses: usize,
    pub draws: usize,

    pub win_rate: f64,
    pub loss_rate: f64,
    pub draw_rate: f64,

    /// ε after the last episode
    pub final_epsilon: f64,

    /// Number of stored Q-values at the end of the run
    pub q_table_size: usize,

    /// Whether a stop signal cut the run short
    pub stopped_early: bool,

    /// Wall-clock duration of the run in seconds
    #[serde(default)]
    pub training_time_secs: f64,

    /// Win rate of each completed `log_interval` window, oldest first
    #[serde(default)]
    pub win_rates: Vec<f64>,
}

impl TrainingResult {
    /// Create a new training result
    pub fn new(
        tally: OutcomeTally,
        final_epsilon: f64,
        q_table_size: usize,
        stopped_early: bool,
    ) -> Self {
        Self {
            total_episodes: tally.total(),
            wins: tally.wins,
            losses: tally.losses,
            draws: tally.draws,
            win_rate: tally.win_rate(),
            loss_rate: tally.loss_rate(),
            draw_rate: tally.draw_rate(),
            final_epsilon,
            q_table_size,
            stopped_early,
            training_time_secs: 0.0,
            win_rates: Vec::new(),
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create result file {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let result = serde_json::from_reader(BufReader::new(file))?;
        Ok(result)
    }
}

/// Training pipeline for a single agent
///
/// An [`IntervalLogger`] is attached automatically when the configuration
/// has a non-zero `log_interval`.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    stop: StopSignal,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        let mut observers: Vec<Box<dyn Observer>> = Vec::new();
        if config.log_interval > 0 {
            observers.push(Box::new(IntervalLogger::new(config.log_interval)));
        }
        Self {
            config,
            observers,
            stop: StopSignal::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Use an externally owned stop signal
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run the configured number of episodes against `agent`
    ///
    /// The agent's ε is overwritten by the schedule before every episode.
    pub fn run(&mut self, agent: &mut QLearningAgent) -> Result<TrainingResult> {
        self.config.validate()?;

        let total = self.config.episode_count;
        let schedule = self.config.schedule();

        let mut opponent = match self.config.opponent_mode {
            OpponentMode::SelfPlay => None,
            OpponentMode::Random => Some(RandomLearner::new("Random".to_string())),
        };
        let mut seat_rng = match self.config.seed {
            Some(seed) => {
                agent.set_rng_seed(seed)?;
                if let Some(opponent) = opponent.as_mut() {
                    opponent.set_rng_seed(seed.wrapping_add(1))?;
                }
                StdRng::seed_from_u64(seed.wrapping_add(2))
            }
            None => StdRng::from_rng(&mut rand::rng()),
        };

        log::info!(
            "training for {total} episodes: opponent {}, seat {:?}, epsilon {} -> {}, alpha {}, gamma {}",
            self.config.opponent_mode.as_str(),
            self.config.seat,
            self.config.epsilon_start,
            self.config.epsilon_end,
            self.config.alpha,
            self.config.gamma,
        );

        for observer in &mut self.observers {
            observer.on_training_start(total)?;
        }

        let started = Instant::now();
        let mut tally = OutcomeTally::new();
        let mut window = OutcomeTally::new();
        let mut win_rates = Vec::new();
        let mut stopped_early = false;

        for episode in 0..total {
            if self.stop.is_stopped() {
                stopped_early = true;
                log::warn!("training stopped after {episode} of {total} episodes");
                break;
            }

            agent.set_epsilon(schedule.epsilon_at(episode, total));
            let agent_player = self.config.seat.seat_for(episode, &mut seat_rng);

            let report = self.play_episode(
                episode,
                agent,
                opponent.as_mut().map(|o| o as &mut dyn Learner),
                agent_player,
            )?;
            agent.record_episode();
            tally.record(report.outcome);

            if self.config.log_interval > 0 {
                window.record(report.outcome);
                if (episode + 1) % self.config.log_interval == 0 {
                    win_rates.push(window.win_rate());
                    window = OutcomeTally::new();
                }
            }

            for observer in &mut self.observers {
                observer.on_episode_end(&report)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let mut result = TrainingResult::new(
            tally,
            agent.epsilon(),
            agent.stats().q_table_size,
            stopped_early,
        );
        result.training_time_secs = started.elapsed().as_secs_f64();
        result.win_rates = win_rates;
        log::info!(
            "training finished in {:.1}s: {} episodes, win rate {:.3}, draw rate {:.3}, loss rate {:.3}, q-table size {}",
            result.training_time_secs,
            result.total_episodes,
            result.win_rate,
            result.draw_rate,
            result.loss_rate,
            result.q_table_size,
        );
        Ok(result)
    }

    /// Play one episode, updating the agent online for its own seat
    ///
    /// A learner move that does not end the game is held back until the
    /// opponent has replied, so a losing reply is charged to it.
    fn play_episode(
        &mut self,
        episode: usize,
        agent: &mut QLearningAgent,
        mut opponent: Option<&mut dyn Learner>,
        agent_player: Player,
    ) -> Result<EpisodeReport> {
        let epsilon = agent.epsilon();
        for observer in &mut self.observers {
            observer.on_episode_start(episode, agent_player, epsilon)?;
        }

        let mut env = Environment::new();
        let mut pending: Option<(BoardState, usize)> = None;
        let mut moves = Vec::with_capacity(9);

        loop {
            let state = env.state();
            let legal = env.legal_actions();
            let by_agent = env.current_player() == agent_player;

            let action = match opponent.as_deref_mut() {
                Some(opponent) if !by_agent => opponent.select_move(&state, &legal, true)?,
                _ => agent.select_action(&state, &legal, true)?,
            };

            let step = env.step(action)?;
            moves.push(action);

            for observer in &mut self.observers {
                observer.on_move(episode, &state, action, by_agent)?;
            }

            if by_agent {
                if step.done {
                    agent.update(state, action, step.reward, &step.state, &[], true)?;
                } else {
                    pending = Some((state, action));
                }
            } else if let Some((pending_state, pending_action)) = pending.take() {
                if step.done {
                    let reward = if step.reward > 0.0 { -1.0 } else { 0.0 };
                    agent.update(
                        pending_state,
                        pending_action,
                        reward,
                        &step.state,
                        &[],
                        true,
                    )?;
                } else {
                    agent.update(
                        pending_state,
                        pending_action,
                        0.0,
                        &step.state,
                        &step.state.legal_actions(),
                        false,
                    )?;
                }
            }

            if step.done {
                break;
            }
        }

        let outcome = match env.winner() {
            Some(winner) => GameOutcome::Win(winner),
            None => GameOutcome::Draw,
        };

        Ok(EpisodeReport {
            episode,
            agent_player,
            outcome: outcome.for_player(agent_player),
            epsilon,
            moves,
            q_table_size: agent.stats().q_table_size,
        })
    }
}

/// Train `agent` with `config` and no extra observers
pub fn train(agent: &mut QLearningAgent, config: &TrainingConfig) -> Result<TrainingResult> {
    TrainingPipeline::new(config.clone()).run(agent)
}
