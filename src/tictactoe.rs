//! Tic-Tac-Toe game implementation

pub mod board;
pub mod game;
pub mod lines;

pub use board::{BoardState, Cell, Player};
pub use game::{EpisodeOutcome, GameOutcome};
pub use lines::{LineAnalyzer, WINNING_LINES};
