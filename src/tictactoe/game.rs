//! Episode outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{BoardState, Player};

/// Absolute outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// Outcome of a terminal board, `None` while the game is still running
    pub fn from_terminal(state: &BoardState) -> Option<Self> {
        if let Some(winner) = state.winner() {
            Some(GameOutcome::Win(winner))
        } else if state.is_terminal() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    /// Outcome as seen by `perspective`
    pub fn for_player(self, perspective: Player) -> EpisodeOutcome {
        match self {
            GameOutcome::Win(winner) if winner == perspective => EpisodeOutcome::Win,
            GameOutcome::Win(_) => EpisodeOutcome::Loss,
            GameOutcome::Draw => EpisodeOutcome::Draw,
        }
    }
}

/// Outcome of an episode relative to the agent being trained or evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Win,
    Loss,
    Draw,
}

impl EpisodeOutcome {
    /// Terminal reward from the perspective player's side
    pub fn reward(self) -> f64 {
        match self {
            EpisodeOutcome::Win => 1.0,
            EpisodeOutcome::Loss => -1.0,
            EpisodeOutcome::Draw => 0.0,
        }
    }
}

impl fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EpisodeOutcome::Win => "win",
            EpisodeOutcome::Loss => "loss",
            EpisodeOutcome::Draw => "draw",
        };
        f.write_str(label)
    }
}
