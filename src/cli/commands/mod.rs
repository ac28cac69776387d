//! Subcommands of the `ttt-qlearning` binary

pub mod evaluate;
pub mod train;
