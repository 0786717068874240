//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `convert`: history to scrobble CSV conversion
//! - `title`: title parsing diagnostics
//! - `cache`: resolution cache inspection and corrections
//! - `setup`: config file creation and tool checks

mod cache;
mod convert;
mod setup;
mod title;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use cache::{cmd_cache_mark, cmd_cache_show, cmd_cache_stats};
pub use convert::{ConvertOptions, cmd_convert};
pub use setup::{cmd_check_tools, cmd_init_config};
pub use title::cmd_parse_title;

/// Convert a YouTube watch history export into scrobbles
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Convert watch-history.json into scrobble CSV shards
    Convert {
        /// Takeout watch history file
        #[arg(default_value = "watch-history.json")]
        history: PathBuf,
        /// Output directory (recreated on every run)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Resolution cache file
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Error log file
        #[arg(long)]
        error_log: Option<PathBuf>,
        /// Skip history entries before this position
        #[arg(long, default_value = "0")]
        start_index: usize,
        /// Filmot API key (or set FILMOT_API_KEY env var)
        #[arg(long, env = "FILMOT_API_KEY")]
        filmot_api_key: Option<String>,
        /// Don't replace titles with DeArrow community titles
        #[arg(long)]
        no_title_overrides: bool,
        /// yt-dlp executable
        #[arg(long)]
        ytdlp: Option<String>,
    },
    /// Show how a video title would be split into artist and track
    ParseTitle {
        /// The video title
        title: String,
        /// Channel name used when no rule matches
        #[arg(short, long, default_value = "")]
        channel: String,
    },
    /// Inspect or correct the resolution cache
    Cache {
        /// Resolution cache file
        #[arg(long)]
        cache: Option<PathBuf>,
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Write a config file with default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Check that yt-dlp is installed
    CheckTools,
}

/// Cache subcommands
#[derive(Subcommand)]
pub enum CacheAction {
    /// Count cached resolutions
    Stats,
    /// Print the cached entry for a video id
    Show {
        video_id: String,
    },
    /// Never look these video ids up again
    MarkUnresolvable {
        #[arg(required = true)]
        video_ids: Vec<String>,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref());

    match &cli.command {
        Commands::Convert {
            history,
            out,
            cache,
            error_log,
            start_index,
            filmot_api_key,
            no_title_overrides,
            ytdlp,
        } => {
            let rt = Runtime::new()?;
            let options = ConvertOptions {
                history: history.clone(),
                out: out.clone(),
                cache: cache.clone(),
                error_log: error_log.clone(),
                start_index: *start_index,
                filmot_api_key: filmot_api_key.clone(),
                no_title_overrides: *no_title_overrides,
                ytdlp: ytdlp.clone(),
            };
            cmd_convert(&rt, config, options)
        }
        Commands::ParseTitle { title, channel } => {
            cmd_parse_title(title, channel);
            Ok(())
        }
        Commands::Cache { cache, action } => {
            let path = cache.clone().unwrap_or(config.cache.path);
            match action {
                CacheAction::Stats => cmd_cache_stats(&path),
                CacheAction::Show { video_id } => cmd_cache_show(&path, video_id),
                CacheAction::MarkUnresolvable { video_ids } => cmd_cache_mark(&path, video_ids),
            }
        }
        Commands::InitConfig { force } => cmd_init_config(cli.config.as_deref(), *force),
        Commands::CheckTools => {
            cmd_check_tools(&config);
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Config {
    match path {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_defaults() {
        let cli = Cli::try_parse_from(["takeout-scrobbler", "convert"]).unwrap();
        match cli.command {
            Commands::Convert {
                history,
                start_index,
                no_title_overrides,
                ..
            } => {
                assert_eq!(history, PathBuf::from("watch-history.json"));
                assert_eq!(start_index, 0);
                assert!(!no_title_overrides);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_parse_cache_mark() {
        let cli = Cli::try_parse_from([
            "takeout-scrobbler",
            "cache",
            "mark-unresolvable",
            "a",
            "b",
        ])
        .unwrap();
        match cli.command {
            Commands::Cache {
                action: CacheAction::MarkUnresolvable { video_ids },
                ..
            } => assert_eq!(video_ids, vec!["a".to_string(), "b".to_string()]),
            _ => panic!("expected cache mark-unresolvable"),
        }
    }

    #[test]
    fn test_mark_requires_ids() {
        assert!(
            Cli::try_parse_from(["takeout-scrobbler", "cache", "mark-unresolvable"]).is_err()
        );
    }
}
