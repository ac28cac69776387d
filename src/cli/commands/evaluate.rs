//! Evaluate command - Play a saved agent greedily against a random opponent

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::MsgPackRepository,
    cli::{
        commands::train::parse_player_token,
        output::{print_evaluation_result, print_kv, print_section},
    },
    pipeline::{EvaluationConfig, EvaluationResult, evaluate_against_random},
    q_learning::QLearningAgent,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Path to trained agent file
    pub agent: PathBuf,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 200)]
    pub games: usize,

    /// Which token the evaluated agent controls (`x` or `o`)
    #[arg(long, default_value = "x")]
    pub agent_player: String,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvaluationExport<'a> {
    agent_file: String,
    training_episodes: usize,
    result: &'a EvaluationResult,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let agent_player = parse_player_token(&args.agent_player, "--agent-player")?;

    println!("Loading trained agent from: {}", args.agent.display());
    let agent = QLearningAgent::load(&MsgPackRepository, &args.agent)
        .with_context(|| format!("Failed to load agent from {}", args.agent.display()))?;

    let stats = agent.stats();
    print_section("Loaded Agent");
    print_kv("Q-table size", &stats.q_table_size.to_string());
    print_kv("States", &stats.state_count.to_string());
    print_kv("Episodes trained", &stats.training_episodes.to_string());

    let config = EvaluationConfig {
        episodes: args.games,
        agent_player,
        seed: args.seed,
    };
    let result = evaluate_against_random(&agent, &config)?;

    print_section("Evaluation Results");
    print_evaluation_result(&result);

    if let Some(path) = &args.export {
        let export = EvaluationExport {
            agent_file: args.agent.display().to_string(),
            training_episodes: stats.training_episodes,
            result: &result,
        };
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &export)?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}
