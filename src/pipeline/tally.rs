//! Win/loss/draw bookkeeping

use serde::{Deserialize, Serialize};

use crate::tictactoe::EpisodeOutcome;

/// Running count of episode outcomes from one player's perspective
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl OutcomeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: EpisodeOutcome) {
        match outcome {
            EpisodeOutcome::Win => self.wins += 1,
            EpisodeOutcome::Loss => self.losses += 1,
            EpisodeOutcome::Draw => self.draws += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.wins + self.losses + self.draws
    }

    fn rate(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally_rates_are_zero() {
        let tally = OutcomeTally::new();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.win_rate(), 0.0);
        assert_eq!(tally.loss_rate(), 0.0);
        assert_eq!(tally.draw_rate(), 0.0);
    }

    #[test]
    fn test_record_and_rates() {
        let mut tally = OutcomeTally::new();
        for outcome in [
            EpisodeOutcome::Win,
            EpisodeOutcome::Win,
            EpisodeOutcome::Loss,
            EpisodeOutcome::Draw,
        ] {
            tally.record(outcome);
        }
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.win_rate(), 0.5);
        assert_eq!(tally.loss_rate(), 0.25);
        assert_eq!(tally.draw_rate(), 0.25);
    }
}
