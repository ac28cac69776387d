//! Train command - Train a Q-learning agent

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    Error,
    adapters::MsgPackRepository,
    cli::output::{print_evaluation_result, print_kv, print_section, print_training_result},
    pipeline::{
        EvaluationConfig, EvaluationResult, JsonlObserver, OpponentMode, ProgressObserver,
        SeatPolicy, TrainingConfig, TrainingPipeline, TrainingResult, evaluate_against_random,
    },
    ports::Learner,
    q_learning::QLearningAgent,
    tictactoe::Player,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    config: &'a TrainingConfig,
    training: &'a TrainingResult,
    evaluation: Option<&'a EvaluationResult>,
    resumed_from: Option<String>,
}

pub(crate) fn parse_player_token(value: &str, flag: &str) -> Result<Player> {
    match value.trim().to_ascii_lowercase().as_str() {
        "x" | "first" | "player1" | "p1" => Ok(Player::X),
        "o" | "second" | "player2" | "p2" => Ok(Player::O),
        other => Err(anyhow!(
            "Invalid value '{other}' for {flag} (expected 'x' or 'o')"
        )),
    }
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OpponentArg {
    /// The agent plays both seats
    SelfPlay,
    /// Uniform random legal moves
    Random,
}

impl From<OpponentArg> for OpponentMode {
    fn from(arg: OpponentArg) -> Self {
        match arg {
            OpponentArg::SelfPlay => OpponentMode::SelfPlay,
            OpponentArg::Random => OpponentMode::Random,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeatArg {
    /// X or O at random each episode
    Random,
    /// X on even episodes, O on odd
    Alternate,
    X,
    O,
}

impl From<SeatArg> for SeatPolicy {
    fn from(arg: SeatArg) -> Self {
        match arg {
            SeatArg::Random => SeatPolicy::Random,
            SeatArg::Alternate => SeatPolicy::Alternate,
            SeatArg::X => SeatPolicy::X,
            SeatArg::O => SeatPolicy::O,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// JSON training configuration; flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Exploration rate on the first episode
    #[arg(long)]
    pub epsilon_start: Option<f64>,

    /// Exploration rate on the last episode
    #[arg(long)]
    pub epsilon_end: Option<f64>,

    /// Learning rate α (0.0-1.0)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Opponent to train against
    #[arg(long, short = 'o', value_enum)]
    pub opponent: Option<OpponentArg>,

    /// Seat the agent learns from each episode
    #[arg(long, value_enum)]
    pub seat: Option<SeatArg>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Episodes between progress log lines (0 disables)
    #[arg(long)]
    pub log_interval: Option<usize>,

    /// Continue training from a saved agent
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Output file for trained agent
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL episode records
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Greedy games against a random opponent after training (0 skips)
    #[arg(long, default_value_t = 200)]
    pub eval_games: usize,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Resolve the effective configuration: file (or defaults), then flags
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => TrainingConfig::default(),
        };

        if let Some(episodes) = self.episodes {
            config.episode_count = episodes;
        }
        if let Some(epsilon) = self.epsilon_start {
            config.epsilon_start = epsilon;
        }
        if let Some(epsilon) = self.epsilon_end {
            config.epsilon_end = epsilon;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(opponent) = self.opponent {
            config.opponent_mode = opponent.into();
        }
        if let Some(seat) = self.seat {
            config.seat = seat.into();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(interval) = self.log_interval {
            config.log_interval = interval;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Load the agent to resume, or build a fresh one
///
/// A damaged snapshot is not fatal: training restarts from scratch. A resumed
/// agent keeps the α and γ it was saved with, and `config` is updated to
/// match so the summary reports what was actually used.
fn initial_agent(
    config: &mut TrainingConfig,
    resume: Option<&Path>,
) -> Result<(QLearningAgent, Option<String>)> {
    let Some(path) = resume else {
        return Ok((config.build_agent(), None));
    };

    match QLearningAgent::load(&MsgPackRepository, path) {
        Ok(mut agent) => {
            if let Some(seed) = config.seed {
                agent.set_rng_seed(seed)?;
            }
            if agent.learning_rate() != config.alpha || agent.discount_factor() != config.gamma {
                log::warn!(
                    "{} was trained with alpha {} and gamma {}; keeping those instead of alpha {} and gamma {}",
                    path.display(),
                    agent.learning_rate(),
                    agent.discount_factor(),
                    config.alpha,
                    config.gamma
                );
                config.alpha = agent.learning_rate();
                config.gamma = agent.discount_factor();
            }
            log::info!(
                "resuming from {} ({} Q-values, {} episodes trained)",
                path.display(),
                agent.stats().q_table_size,
                agent.training_episodes()
            );
            Ok((agent, Some(path.display().to_string())))
        }
        Err(err @ (Error::CorruptSnapshot { .. } | Error::UnsupportedSnapshotVersion { .. })) => {
            log::warn!(
                "ignoring unusable snapshot {}: {err}; starting from a fresh agent",
                path.display()
            );
            Ok((config.build_agent(), None))
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to load agent from {}", path.display()))
        }
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = args.training_config()?;
    let (mut agent, resumed_from) = initial_agent(&mut config, args.resume.as_deref())?;

    print_section("Training Configuration");
    print_kv("Episodes", &config.episode_count.to_string());
    print_kv("Opponent", config.opponent_mode.as_str());
    print_kv("Seat", &format!("{:?}", config.seat));
    print_kv(
        "Epsilon",
        &format!("{} -> {}", config.epsilon_start, config.epsilon_end),
    );
    print_kv("Alpha", &agent.learning_rate().to_string());
    print_kv("Gamma", &agent.discount_factor().to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }
    if let Some(source) = &resumed_from {
        print_kv("Resumed from", source);
    }

    let mut pipeline = TrainingPipeline::new(config.clone());
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let result = pipeline.run(&mut agent)?;

    print_section("Training Results");
    print_training_result(&result);

    let evaluation = if args.eval_games > 0 {
        let eval_config = EvaluationConfig {
            episodes: args.eval_games,
            agent_player: config.seat.fixed_seat().unwrap_or(Player::X),
            seed: config.seed.map(|s| s.wrapping_add(1)),
        };
        let evaluation = evaluate_against_random(&agent, &eval_config)?;
        print_section("Evaluation vs Random");
        print_evaluation_result(&evaluation);
        Some(evaluation)
    } else {
        None
    };

    if let Some(output) = &args.output {
        agent
            .save_with_metadata(&MsgPackRepository, output, config.metadata(&result))
            .with_context(|| format!("Failed to save agent to {}", output.display()))?;
        println!("\n✓ Agent saved to: {}", output.display());
    }

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let summary = TrainingSummaryFile {
            config: &config,
            training: &result,
            evaluation: evaluation.as_ref(),
            resumed_from,
        };
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("✓ Summary written to: {}", path.display());
    }

    Ok(())
}
