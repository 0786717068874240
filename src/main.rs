//! Takeout Scrobbler - turns a YouTube watch history export into scrobbles.
//!
//! Each watched video is attributed to an artist and track using the YouTube
//! Music catalog, yt-dlp and the Filmot index, falling back to parsing the
//! video title. Results are cached per video id so long runs can be
//! interrupted and resumed.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod output;
pub mod resolver;
pub mod run;
pub mod sources;
#[cfg(test)]
pub mod test_utils;
pub mod title;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Conventional status for a process stopped by SIGINT
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("takeout_scrobbler=info".parse().expect("valid log directive")),
        )
        .init();

    match cli::run_command(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupted(&e) => {
            eprintln!("Interrupted; progress is saved in the cache, run again to resume");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn is_interrupted(e: &anyhow::Error) -> bool {
    e.downcast_ref::<error::Error>()
        .is_some_and(error::Error::is_interrupted)
}
