//! Setup commands: config file creation and tool checks.

use std::path::Path;

use crate::config::{self, Config};
use crate::sources::ytdlp::YtDlpExtractor;

/// Write a default config file
pub fn cmd_init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_path().ok_or(config::ConfigError::NoConfigDir)?,
    };

    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    config::save_to(&Config::default(), &path)?;
    println!("Wrote default config to {}", path.display());
    println!("Add a Filmot API key under [credentials] to look up removed videos.");
    Ok(())
}

/// Report whether yt-dlp can be run
pub fn cmd_check_tools(config: &Config) {
    let extractor = YtDlpExtractor::new(&config.sources.ytdlp_path);
    match extractor.version() {
        Some(version) => println!("✓ yt-dlp {} ({})", version, config.sources.ytdlp_path),
        None => {
            println!("✗ yt-dlp not found at {:?}", config.sources.ytdlp_path);
            println!();
            println!("Install yt-dlp:");
            println!("  Windows: winget install yt-dlp");
            println!("  macOS:   brew install yt-dlp");
            println!("  Linux:   pipx install yt-dlp");
        }
    }

    match &config.credentials.filmot_api_key {
        Some(key) if !key.is_empty() => println!("✓ Filmot API key configured"),
        _ => println!("✗ No Filmot API key; removed videos will be skipped"),
    }
}
