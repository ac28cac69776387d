//! Step/reset environment wrapping the board model
//!
//! The environment tracks a single episode: the current board and whether
//! it has finished. Rewards are reported from the perspective of the player
//! who just moved; translating them for the other seat is the trainer's job.

use std::fmt;

use crate::{
    Error, Result,
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Result of applying one action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Board after the move
    pub state: BoardState,
    /// `1.0` if the move won the game, `0.0` otherwise
    pub reward: f64,
    /// Whether the board is terminal
    pub done: bool,
}

/// Single-episode tic-tac-toe environment
#[derive(Debug, Clone, Default)]
pub struct Environment {
    state: BoardState,
    done: bool,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new episode and return the empty board
    pub fn reset(&mut self) -> BoardState {
        self.state = BoardState::initial();
        self.done = false;
        self.state
    }

    /// Apply `action` for the player whose turn it is.
    ///
    /// # Errors
    ///
    /// - [`Error::GameOver`] if the episode already finished
    /// - [`Error::IllegalAction`] if `action` is out of range or occupied
    pub fn step(&mut self, action: usize) -> Result<StepOutcome> {
        if self.done {
            return Err(Error::GameOver);
        }

        let mover = self.state.to_move();
        let next = self
            .state
            .apply(action, mover)
            .map_err(|_| Error::IllegalAction {
                action,
                legal: self.state.legal_actions(),
            })?;

        let won = next.has_won(mover);
        self.state = next;
        self.done = next.is_terminal();

        Ok(StepOutcome {
            state: next,
            reward: if won { 1.0 } else { 0.0 },
            done: self.done,
        })
    }

    /// Legal actions on the current board
    pub fn legal_actions(&self) -> Vec<usize> {
        self.state.legal_actions()
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn current_player(&self) -> Player {
        self.state.to_move()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn winner(&self) -> Option<Player> {
        self.state.winner()
    }

    /// Outcome of the episode once it has finished
    pub fn outcome(&self) -> Option<GameOutcome> {
        GameOutcome::from_terminal(&self.state)
    }

    /// Final reward for `player`: `+1` win, `-1` loss, `0` draw or unfinished
    pub fn reward_for(&self, player: Player) -> f64 {
        if !self.done {
            return 0.0;
        }
        match self.winner() {
            Some(winner) if winner == player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.state.render())
    }
}
