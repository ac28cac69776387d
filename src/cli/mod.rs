//! CLI infrastructure for the tic-tac-toe Q-learning toolkit
//!
//! This module provides the command-line interface for training and
//! evaluating agents. It only drives the library API.

pub mod commands;
pub mod output;
