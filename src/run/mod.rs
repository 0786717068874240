//! The conversion run loop.
//!
//! Walks the history entries in order, resolves each one and writes a row for
//! every accepted record. The cache is flushed however the loop ends: after
//! the last entry, before a fault propagates, and when the user interrupts.

use std::future::Future;

use crate::cache::ResolutionCache;
use crate::error::{Error, Result};
use crate::model::{HistoryEntry, OutputRow};
use crate::output::RowSink;
use crate::resolver::SourceResolver;

/// Entries between progress reports
const PROGRESS_INTERVAL: usize = 500;

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries visited, starting from the start index
    pub entries_seen: usize,
    pub rows_written: usize,
    /// Cache entries after the run
    pub cache_size: usize,
    /// Messages added to the error log
    pub errors_logged: usize,
}

/// Drives a [`SourceResolver`] over a history and owns the run's cache.
pub struct RunController<S: RowSink> {
    resolver: SourceResolver,
    cache: ResolutionCache,
    sink: S,
    start_index: usize,
}

impl<S: RowSink> RunController<S> {
    pub fn new(resolver: SourceResolver, cache: ResolutionCache, sink: S) -> Self {
        Self {
            resolver,
            cache,
            sink,
            start_index: 0,
        }
    }

    /// Skip entries before `index`.
    pub fn start_at(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run until done, a fault, or Ctrl-C.
    pub async fn run(&mut self, entries: &[HistoryEntry]) -> Result<RunSummary> {
        self.run_until(entries, ctrl_c()).await
    }

    /// Run until done, a fault, or `interrupt` completes.
    ///
    /// An interrupt yields [`Error::Interrupted`] once the cache is flushed.
    pub async fn run_until(
        &mut self,
        entries: &[HistoryEntry],
        interrupt: impl Future<Output = ()>,
    ) -> Result<RunSummary> {
        let outcome = self.process(entries, interrupt).await;

        let finished = self.sink.finish();
        let flushed = self.cache.flush();

        match outcome {
            Ok(mut summary) => {
                flushed?;
                finished?;
                summary.cache_size = self.cache.len();
                summary.errors_logged = self.resolver.errors_recorded();
                tracing::info!(
                    "{} rows written from {} entries, {} cached",
                    summary.rows_written,
                    summary.entries_seen,
                    summary.cache_size
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(flush_error) = flushed {
                    tracing::error!("Failed to save cache: {}", flush_error);
                }
                if let Err(finish_error) = finished {
                    tracing::error!("Failed to finish output: {}", finish_error);
                }
                Err(e)
            }
        }
    }

    async fn process(
        &mut self,
        entries: &[HistoryEntry],
        interrupt: impl Future<Output = ()>,
    ) -> Result<RunSummary> {
        let mut interrupt = std::pin::pin!(interrupt);
        let mut summary = RunSummary::default();
        let total = entries.len();

        for (index, entry) in entries.iter().enumerate().skip(self.start_index) {
            let resolved = tokio::select! {
                biased;
                _ = &mut interrupt => {
                    tracing::warn!("Interrupted at entry {} of {}", index, total);
                    return Err(Error::Interrupted);
                }
                result = self.resolver.resolve(entry, &mut self.cache) => result,
            };

            let resolved = resolved.inspect_err(|e| {
                tracing::error!(
                    "Stopped at entry {} ({}): {}",
                    index,
                    entry.video_id().unwrap_or_default(),
                    e
                );
            })?;

            summary.entries_seen += 1;
            if let Some(record) = resolved {
                self.sink.write_row(&OutputRow::new(&record, entry))?;
                summary.rows_written += 1;
            }

            if (index + 1) % PROGRESS_INTERVAL == 0 {
                tracing::info!("Processed {}/{} entries", index + 1, total);
            }
        }

        Ok(summary)
    }
}

/// Completes on Ctrl-C. Never completes if the handler can't be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CacheEntry;
    use crate::output::{ErrorLog, ShardedCsvWriter};
    use crate::resolver::ResolverConfig;
    use crate::sources::LookupError;
    use crate::sources::traits::mocks::MockCatalog;
    use crate::test_utils::{MemorySink, MockSources, candidate, record, watch_entry};
    use tempfile::TempDir;

    const ATV: &str = "MUSIC_VIDEO_TYPE_ATV";

    /// `count` entries ten minutes apart, newest first, ids `v0`, `v1`, ...
    fn history(count: usize) -> Vec<HistoryEntry> {
        let start = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z").unwrap();
        (0..count)
            .map(|i| {
                let time = start - chrono::TimeDelta::minutes(10 * i as i64);
                watch_entry(&format!("v{i}"), "YouTube Music", &time.to_rfc3339())
            })
            .collect()
    }

    fn catalog_for(count: usize) -> MockCatalog {
        (0..count).fold(MockCatalog::empty(), |catalog, i| {
            let id = format!("v{i}");
            let hit = candidate(&id, &format!("Song {i}"), &["Artist"], ATV, Some(200));
            catalog.with(&id, vec![hit])
        })
    }

    fn controller<S: RowSink>(
        mocks: &MockSources,
        cache: ResolutionCache,
        sink: S,
    ) -> RunController<S> {
        let resolver = SourceResolver::new(
            mocks.sources(),
            ResolverConfig::default(),
            ErrorLog::discard(),
        );
        RunController::new(resolver, cache, sink)
    }

    #[tokio::test]
    async fn test_full_run_writes_rows_and_flushes() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("results_cache.json");
        let mocks = MockSources::default().with_catalog(catalog_for(3));
        let mut run = controller(&mocks, ResolutionCache::load(&cache_path).unwrap(), MemorySink::default());

        let summary = run
            .run_until(&history(3), std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.entries_seen, 3);
        assert_eq!(summary.rows_written, 3);
        assert_eq!(summary.cache_size, 3);
        assert!(run.sink().finished);
        assert_eq!(run.sink().rows[0].track, "Song 0");
        assert_eq!(run.sink().rows[0].duration, "00:03:20");
        assert!(!run.cache().is_dirty());
        assert_eq!(ResolutionCache::load(&cache_path).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fault_flushes_resolutions_made_so_far() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("results_cache.json");
        let mocks = MockSources::default().with_catalog(
            catalog_for(5).failing_on("v3", LookupError::Network("connection reset".into())),
        );
        let mut run = controller(&mocks, ResolutionCache::load(&cache_path).unwrap(), MemorySink::default());

        let result = run.run_until(&history(5), std::future::pending()).await;

        assert!(result.is_err());
        assert_eq!(run.sink().rows.len(), 3);
        assert!(run.sink().finished);

        let persisted = ResolutionCache::load(&cache_path).unwrap();
        assert_eq!(persisted.len(), 3);
        assert!(persisted.contains("v2"));
        assert!(!persisted.contains("v3"));
    }

    #[tokio::test]
    async fn test_interrupt_flushes_and_reports() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("results_cache.json");
        let mut cache = ResolutionCache::load(&cache_path).unwrap();
        cache.put("earlier", CacheEntry::Resolved(record("A", "T")));
        let mocks = MockSources::default().with_catalog(catalog_for(2));
        let mut run = controller(&mocks, cache, MemorySink::default());

        let result = run.run_until(&history(2), std::future::ready(())).await;

        assert!(matches!(result, Err(Error::Interrupted)));
        assert_eq!(mocks.catalog.calls(), 0);
        assert_eq!(ResolutionCache::load(&cache_path).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_start_index_skips_entries() {
        let temp = TempDir::new().unwrap();
        let mocks = MockSources::default().with_catalog(catalog_for(4));
        let cache = ResolutionCache::load(temp.path().join("c.json")).unwrap();
        let mut run = controller(&mocks, cache, MemorySink::default()).start_at(2);

        let summary = run
            .run_until(&history(4), std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.entries_seen, 2);
        assert_eq!(run.sink().rows[0].track, "Song 2");
        assert!(!run.cache().contains("v0"));
    }

    #[tokio::test]
    async fn test_resume_uses_cache_from_previous_run() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("results_cache.json");
        let entries = history(3);

        let first = MockSources::default().with_catalog(catalog_for(3));
        controller(&first, ResolutionCache::load(&cache_path).unwrap(), MemorySink::default())
            .run_until(&entries, std::future::pending())
            .await
            .unwrap();

        let second = MockSources::default();
        let mut run = controller(&second, ResolutionCache::load(&cache_path).unwrap(), MemorySink::default());
        let summary = run
            .run_until(&entries, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.rows_written, 3);
        assert_eq!(second.catalog.calls(), 0);
    }

    #[tokio::test]
    async fn test_sink_failure_still_flushes_cache() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("results_cache.json");
        let mocks = MockSources::default().with_catalog(catalog_for(3));
        let sink = MemorySink {
            fail_after: Some(1),
            ..Default::default()
        };
        let mut run = controller(&mocks, ResolutionCache::load(&cache_path).unwrap(), sink);

        assert!(run.run_until(&history(3), std::future::pending()).await.is_err());
        assert_eq!(ResolutionCache::load(&cache_path).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_csv_shards_at_boundary() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let mocks = MockSources::default().with_catalog(catalog_for(5));
        let sink = ShardedCsvWriter::create(&out, 2).unwrap();
        let cache = ResolutionCache::load(temp.path().join("c.json")).unwrap();
        let mut run = controller(&mocks, cache, sink);

        run.run_until(&history(5), std::future::pending())
            .await
            .unwrap();

        assert_eq!(run.sink().shard_count(), 3);
        for (part, rows) in [(0, 2), (1, 2), (2, 1)] {
            let text = std::fs::read_to_string(out.join(format!("part{part}.csv"))).unwrap();
            assert_eq!(text.lines().count(), rows);
        }
    }
}
