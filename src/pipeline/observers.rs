//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::tally::OutcomeTally;
use crate::{
    Error, Result,
    ports::{EpisodeReport, Observer},
    tictactoe::{BoardState, EpisodeOutcome, Player},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    tally: OutcomeTally,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            tally: OutcomeTally::new(),
        }
    }

    fn message(&self) -> String {
        format!(
            "{} D:{} L:{}",
            self.tally.wins, self.tally.draws, self.tally.losses
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.tally.record(report.outcome);

        if let Some(pb) = &self.progress_bar {
            pb.set_position(report.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    tally: OutcomeTally,
    move_counts: Vec<usize>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self) -> OutcomeTally {
        self.tally
    }

    /// Get average episode length in moves
    pub fn avg_episode_length(&self) -> f64 {
        if self.move_counts.is_empty() {
            0.0
        } else {
            self.move_counts.iter().sum::<usize>() as f64 / self.move_counts.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.tally.total(),
            wins: self.tally.wins,
            draws: self.tally.draws,
            losses: self.tally.losses,
            win_rate: self.tally.win_rate(),
            draw_rate: self.tally.draw_rate(),
            loss_rate: self.tally.loss_rate(),
            avg_episode_length: self.avg_episode_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub avg_episode_length: f64,
}

impl Observer for MetricsObserver {
    fn on_episode_start(
        &mut self,
        _episode: usize,
        _agent_player: Player,
        _epsilon: f64,
    ) -> Result<()> {
        self.move_counts.push(0);
        Ok(())
    }

    fn on_move(
        &mut self,
        _episode: usize,
        _state: &BoardState,
        _action: usize,
        _by_agent: bool,
    ) -> Result<()> {
        if let Some(last) = self.move_counts.last_mut() {
            *last += 1;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.tally.record(report.outcome);
        Ok(())
    }
}

/// Interval logger - Emits a progress line through `log` every `interval` episodes
///
/// The reported win rate covers only the episodes since the previous line.
#[derive(Debug)]
pub struct IntervalLogger {
    interval: usize,
    window: OutcomeTally,
    overall: OutcomeTally,
}

impl IntervalLogger {
    /// Create a new interval logger; an interval of zero is treated as one
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            window: OutcomeTally::new(),
            overall: OutcomeTally::new(),
        }
    }
}

impl Observer for IntervalLogger {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.window.record(report.outcome);
        self.overall.record(report.outcome);

        let completed = report.episode + 1;
        if completed % self.interval == 0 {
            log::info!(
                "episode {completed}: window win rate {:.3} (W:{} D:{} L:{}), epsilon {:.4}, q-table size {}",
                self.window.win_rate(),
                self.window.wins,
                self.window.draws,
                self.window.losses,
                report.epsilon,
                report.q_table_size,
            );
            self.window = OutcomeTally::new();
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        log::info!(
            "{} episodes observed: win rate {:.3}, draw rate {:.3}, loss rate {:.3}",
            self.overall.total(),
            self.overall.win_rate(),
            self.overall.draw_rate(),
            self.overall.loss_rate(),
        );
        Ok(())
    }
}

/// One exported training episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub agent_player: Player,
    pub moves: Vec<usize>,
    pub outcome: EpisodeOutcome,
    pub epsilon: f64,
    pub q_table_size: usize,
}

impl From<&EpisodeReport> for EpisodeRecord {
    fn from(report: &EpisodeReport) -> Self {
        Self {
            episode: report.episode,
            agent_player: report.agent_player,
            moves: report.moves.clone(),
            outcome: report.outcome,
            epsilon: report.epsilon,
            q_table_size: report.q_table_size,
        }
    }
}

/// JSONL observer - Exports episodes to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer, truncating any existing file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create episode log {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        // One JSON object per line
        serde_json::to_writer(&mut self.writer, &EpisodeRecord::from(report))?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
