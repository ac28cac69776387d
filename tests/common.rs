//! Common test utilities for the ttt-qlearning test suite.
//!
//! Exhaustive enumeration of the game tree, shared by the rule and
//! persistence tests.

#![allow(dead_code)]

use std::collections::HashSet;

use ttt_qlearning::tictactoe::BoardState;

/// Every board reachable from the empty board by legal play, terminal
/// boards included, each listed once.
pub fn reachable_states() -> Vec<BoardState> {
    fn visit(state: BoardState, seen: &mut HashSet<BoardState>, order: &mut Vec<BoardState>) {
        if !seen.insert(state) {
            return;
        }
        order.push(state);
        if state.is_terminal() {
            return;
        }
        for action in state.legal_actions() {
            let next = state.make_move(action).expect("Expected legal move");
            visit(next, seen, order);
        }
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    visit(BoardState::initial(), &mut seen, &mut order);
    order
}

/// Reachable boards where a move is still to be made
pub fn decision_states() -> Vec<BoardState> {
    reachable_states()
        .into_iter()
        .filter(|state| !state.is_terminal())
        .collect()
}
