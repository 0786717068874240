//! Test utilities and fixtures for takeout-scrobbler tests.
//!
//! This module provides history entry and record factories, an in-memory
//! row sink, and a builder for mock-backed [`Sources`].
//!
//! # Example
//!
//! ```ignore
//! use takeout_scrobbler::test_utils::{watch_entry, MockSources};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let mocks = MockSources::default();
//!     let entry = watch_entry("abc", "YouTube Music", "2024-03-01T12:00:00Z");
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;

use chrono::DateTime;

use crate::error::Result;
use crate::model::{Confidence, HistoryEntry, OutputRow, ResolvedRecord};
use crate::output::RowSink;
use crate::sources::Sources;
use crate::sources::domain::CatalogCandidate;
use crate::sources::traits::mocks::{MockCatalog, MockExtractor, MockIndex, MockTitles};

/// Timestamp used by [`entry`].
pub const DEFAULT_TIME: &str = "2024-03-01T12:00:00Z";

/// A history entry for `url` watched at [`DEFAULT_TIME`].
pub fn entry(url: &str, label: &str) -> HistoryEntry {
    entry_at(url, label, DEFAULT_TIME)
}

/// A history entry for `url` watched at `time` (RFC 3339).
pub fn entry_at(url: &str, label: &str, time: &str) -> HistoryEntry {
    HistoryEntry {
        target_url: Some(url.to_string()),
        source_label: label.to_string(),
        time: time.to_string(),
        timestamp: Some(DateTime::parse_from_rfc3339(time).expect("valid test timestamp")),
        raw_title: "Title".to_string(),
        raw_channel: "Channel".to_string(),
    }
}

/// A history entry for a watch link to `video_id`.
pub fn watch_entry(video_id: &str, label: &str, time: &str) -> HistoryEntry {
    entry_at(
        &format!("https://www.youtube.com/watch?v={video_id}"),
        label,
        time,
    )
}

/// A catalog-confidence record with album "Album" and a 200 second duration.
pub fn record(artist: &str, track: &str) -> ResolvedRecord {
    ResolvedRecord {
        artist: artist.to_string(),
        track: track.to_string(),
        album: "Album".to_string(),
        duration_seconds: Some(200),
        confidence: Confidence::Catalog,
    }
}

/// The output row for [`record`] at [`DEFAULT_TIME`].
pub fn output_row(artist: &str, track: &str) -> OutputRow {
    OutputRow::new(&record(artist, track), &entry("", "YouTube Music"))
}

/// A catalog hit for `video_id`.
pub fn candidate(
    video_id: &str,
    title: &str,
    artists: &[&str],
    video_type: &str,
    duration_seconds: Option<u64>,
) -> CatalogCandidate {
    CatalogCandidate {
        video_id: Some(video_id.to_string()),
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        album: None,
        duration_seconds,
        video_type: Some(video_type.to_string()),
    }
}

/// Mock sources kept behind `Arc`s so tests can inspect call counts after
/// handing them to a resolver.
#[derive(Clone)]
pub struct MockSources {
    pub catalog: Arc<MockCatalog>,
    pub extractor: Arc<MockExtractor>,
    pub index: Arc<MockIndex>,
    pub titles: Option<Arc<MockTitles>>,
}

impl Default for MockSources {
    fn default() -> Self {
        Self {
            catalog: Arc::new(MockCatalog::empty()),
            extractor: Arc::new(MockExtractor::empty()),
            index: Arc::new(MockIndex::empty()),
            titles: None,
        }
    }
}

impl MockSources {
    pub fn with_catalog(mut self, catalog: MockCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_extractor(mut self, extractor: MockExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_index(mut self, index: MockIndex) -> Self {
        self.index = Arc::new(index);
        self
    }

    pub fn with_titles(mut self, titles: MockTitles) -> Self {
        self.titles = Some(Arc::new(titles));
        self
    }

    pub fn sources(&self) -> Sources {
        Sources {
            catalog: self.catalog.clone(),
            extractor: self.extractor.clone(),
            index: Some(self.index.clone()),
            titles: self
                .titles
                .clone()
                .map(|t| t as Arc<dyn crate::sources::TitleOverrideApi>),
        }
    }
}

/// Row sink that keeps rows in memory, optionally failing after a number of rows.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<OutputRow>,
    pub finished: bool,
    pub fail_after: Option<usize>,
}

impl RowSink for MemorySink {
    fn write_row(&mut self, row: &OutputRow) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.rows.len() >= limit) {
            return Err(std::io::Error::other("sink full").into());
        }
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
