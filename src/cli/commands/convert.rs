//! The conversion command.

use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::cache::ResolutionCache;
use crate::config::Config;
use crate::history;
use crate::output::{ErrorLog, ShardedCsvWriter};
use crate::resolver::{ResolverConfig, SourceResolver};
use crate::run::RunController;
use crate::sources::Sources;

/// Command-line settings for a conversion; `None` keeps the config value
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub history: PathBuf,
    pub out: Option<PathBuf>,
    pub cache: Option<PathBuf>,
    pub error_log: Option<PathBuf>,
    pub start_index: usize,
    pub filmot_api_key: Option<String>,
    pub no_title_overrides: bool,
    pub ytdlp: Option<String>,
}

impl ConvertOptions {
    /// Layer the command-line settings over `config`.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
        if let Some(cache) = &self.cache {
            config.cache.path = cache.clone();
        }
        if let Some(error_log) = &self.error_log {
            config.output.error_log = error_log.clone();
        }
        if let Some(key) = &self.filmot_api_key {
            config.credentials.filmot_api_key = Some(key.clone());
        }
        if self.no_title_overrides {
            config.sources.use_title_overrides = false;
        }
        if let Some(ytdlp) = &self.ytdlp {
            config.sources.ytdlp_path = ytdlp.clone();
        }
        config
    }
}

/// Convert a watch history into scrobble CSV shards
pub fn cmd_convert(rt: &Runtime, config: Config, options: ConvertOptions) -> anyhow::Result<()> {
    let config = options.apply(config);
    config.validate()?;

    let entries = history::load(&options.history)?;
    if options.start_index > 0 {
        println!("Starting at entry {} of {}", options.start_index, entries.len());
    }

    rt.block_on(async {
        let sources = Sources::from_config(&config)?;
        let errors = ErrorLog::open(&config.output.error_log)?;
        let resolver = SourceResolver::new(
            sources,
            ResolverConfig::from_config(&config.scrobble),
            errors,
        );
        let cache = ResolutionCache::load(&config.cache.path)?;
        let sink = ShardedCsvWriter::create(&config.output.dir, config.output.shard_size)?;

        let mut run = RunController::new(resolver, cache, sink).start_at(options.start_index);
        let summary = run.run(&entries).await?;

        println!();
        println!("Entries processed: {}", summary.entries_seen);
        println!("Scrobbles written: {}", summary.rows_written);
        println!("Shards:            {}", run.sink().shard_count());
        println!(
            "Cached videos:     {} ({})",
            summary.cache_size,
            run.cache().path().display()
        );
        if summary.errors_logged > 0 {
            println!(
                "Problems logged:   {} (see {})",
                summary.errors_logged,
                config.output.error_log.display()
            );
        }
        println!("Output:            {}", run.sink().dir().display());
        Ok::<(), anyhow::Error>(())
    })
}
