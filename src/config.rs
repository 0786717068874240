//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\takeout-scrobbler\config.toml
//! - macOS: ~/Library/Application Support/takeout-scrobbler/config.toml
//! - Linux: ~/.config/takeout-scrobbler/config.toml
//!
//! Every section is optional; missing keys fall back to defaults. CLI flags
//! override whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// Metadata source settings
    pub sources: SourcesConfig,

    /// Scrobble acceptance policy
    pub scrobble: ScrobbleConfig,

    /// Output files
    pub output: OutputConfig,

    /// Resolution cache
    pub cache: CacheConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Filmot API key. The video-index tier is skipped without one.
    pub filmot_api_key: Option<String>,
}

/// Metadata source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Replace titles with crowd-sourced DeArrow titles before parsing
    pub use_title_overrides: bool,

    /// yt-dlp executable (name in PATH or absolute path)
    pub ytdlp_path: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            use_title_overrides: true,
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

/// Scrobble acceptance policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrobbleConfig {
    /// Minimum fraction of the track that must have played (0.0 - 1.0)
    pub min_played_fraction: f64,

    /// History header that marks the music surface
    pub music_surface_label: String,

    /// Artist names that are never scrobbled
    pub denied_artists: Vec<String>,
}

impl Default for ScrobbleConfig {
    fn default() -> Self {
        Self {
            min_played_fraction: 0.5,
            music_surface_label: "YouTube Music".to_string(),
            denied_artists: default_denied_artists(),
        }
    }
}

/// Channels that upload gameplay or commentary under a music-looking title.
fn default_denied_artists() -> Vec<String> {
    [
        "cpol",
        "cpol_",
        "Mafham",
        "mrekk",
        "NaPiii_",
        "JappaDeKappa",
        "Whitecat",
        "Akatsuki",
        "Hugofrost",
        "4096",
        "Honest Trailers",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for CSV shards (recreated on every run)
    pub dir: PathBuf,

    /// Rows per CSV shard
    pub shard_size: usize,

    /// Append-only log of lookup problems
    pub error_log: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            shard_size: 2800,
            error_log: PathBuf::from("errors.txt"),
        }
    }
}

/// Resolution cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// JSON file holding every resolved video id
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("results_cache.json"),
        }
    }
}

impl Config {
    /// Reject values the run cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.shard_size == 0 {
            return Err(ConfigError::Invalid("output.shard_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.scrobble.min_played_fraction) {
            return Err(ConfigError::Invalid(
                "scrobble.min_played_fraction must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("takeout-scrobbler"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path
///
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk at `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[sources]"));
        assert!(toml.contains("[scrobble]"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("[cache]"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.shard_size, 2800);
        assert_eq!(config.scrobble.min_played_fraction, 0.5);
        assert_eq!(config.scrobble.music_surface_label, "YouTube Music");
        assert!(config.scrobble.denied_artists.iter().any(|a| a == "Honest Trailers"));
        assert!(config.credentials.filmot_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[credentials]
filmot_api_key = "my-key"

[scrobble]
denied_artists = ["Somebody"]
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.credentials.filmot_api_key, Some("my-key".to_string()));
        assert_eq!(config.scrobble.denied_artists, vec!["Somebody".to_string()]);

        // Other fields use defaults
        assert_eq!(config.scrobble.min_played_fraction, 0.5);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(config.sources.use_title_overrides);
    }

    #[test]
    fn test_validate_rejects_zero_shard_size() {
        let mut config = Config::default();
        config.output.shard_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.credentials.filmot_api_key = Some("k".to_string());
        config.output.shard_size = 10;
        save_to(&config, &path).unwrap();

        let loaded = load_from(&path);
        assert_eq!(loaded.credentials.filmot_api_key.as_deref(), Some("k"));
        assert_eq!(loaded.output.shard_size, 10);
    }

    #[test]
    fn test_load_malformed_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let config = load_from(&path);
        assert_eq!(config.output.shard_size, 2800);
    }
}
