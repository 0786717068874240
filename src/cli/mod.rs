//! Command-line interface for takeout-scrobbler.
//!
//! `convert` is the main workflow; the other commands inspect and correct
//! its inputs and state without running a conversion.

mod commands;

pub use commands::{Cli, Commands, run_command};
