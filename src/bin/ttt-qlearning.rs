//! Command-line entry point for training and evaluating Q-learning agents
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ttt-qlearning")]
#[command(version, about = "Tabular Q-learning for tic-tac-toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent by self-play or against a random opponent
    Train(Box<ttt_qlearning::cli::commands::train::TrainArgs>),

    /// Evaluate a trained agent against a random opponent
    Evaluate(ttt_qlearning::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => ttt_qlearning::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => ttt_qlearning::cli::commands::evaluate::execute(args),
    }
}
