//! Per-entry resolution: cache, tiered lookups, playback filter, attribution.
//!
//! For a watchable entry the resolver:
//! 1. Measures how long the entry could have played (gap to the newer entry)
//! 2. Answers from the [`ResolutionCache`] when it can
//! 3. Otherwise asks the sources in order, stopping at the first hit:
//!    catalog search, then yt-dlp (music surface only), then the video index
//!    (only for videos yt-dlp reports unavailable)
//! 4. Drops plays shorter than the configured fraction of the track
//! 5. Attributes artist and track, verbatim for official releases and by
//!    title parsing otherwise
//! 6. Drops denylisted artists, caches everything else
//!
//! Entries must arrive newest first; the playback gap is only meaningful in
//! that order.

mod policy;

pub use policy::{
    Denylist, PlaybackClock, ResolverConfig, catalog_track_name, join_artists, should_scrobble,
};

use chrono::TimeDelta;

use crate::cache::ResolutionCache;
use crate::error::{Error, Result};
use crate::model::{CacheEntry, Confidence, HistoryEntry, ResolvedRecord};
use crate::output::ErrorLog;
use crate::sources::{LookupError, SourceKind, SourceRecord, Sources};
use crate::title;

/// Outcome of the extractor tier
enum Extraction {
    Found(SourceRecord),
    NotFound,
    Unavailable,
}

/// Turns history entries into resolved records.
pub struct SourceResolver {
    sources: Sources,
    config: ResolverConfig,
    clock: PlaybackClock,
    errors: ErrorLog,
}

impl SourceResolver {
    pub fn new(sources: Sources, config: ResolverConfig, errors: ErrorLog) -> Self {
        Self {
            sources,
            config,
            clock: PlaybackClock::default(),
            errors,
        }
    }

    /// Error log messages recorded so far.
    pub fn errors_recorded(&self) -> usize {
        self.errors.recorded()
    }

    /// Resolve one entry.
    ///
    /// `Ok(None)` covers everything that produces no output row: unwatchable
    /// entries, tombstones, short plays, denylisted artists and videos no
    /// source knows. `Err` is reserved for faults that should stop the run.
    pub async fn resolve(
        &mut self,
        entry: &HistoryEntry,
        cache: &mut ResolutionCache,
    ) -> Result<Option<ResolvedRecord>> {
        let (Some(video_id), Some(timestamp)) = (entry.video_id(), entry.timestamp) else {
            return Ok(None);
        };
        let played = self.clock.observe(timestamp);

        match cache.get(&video_id) {
            Some(CacheEntry::Unresolvable) => {
                tracing::debug!("{} is marked unresolvable", video_id);
                return Ok(None);
            }
            Some(CacheEntry::Resolved(record)) => {
                if !self.played_enough(&video_id, record.duration_seconds, played) {
                    return Ok(None);
                }
                tracing::info!("{} - {}", record.artist, record.track);
                return Ok(Some(record.clone()));
            }
            None => {}
        }

        let Some(found) = self.lookup(&video_id, entry).await? else {
            return Ok(None);
        };

        if !self.played_enough(&video_id, found.duration_seconds, played) {
            return Ok(None);
        }

        if found.source == SourceKind::MusicCatalog
            && !found.is_music_release
            && entry.source_label != self.config.music_surface_label
        {
            self.errors
                .record(&format!("check {}: {}", video_id, found.title));
        }

        let record = self.attribute(&video_id, found).await;

        if self.config.denylist.contains(&record.artist) {
            tracing::debug!("Skipping {}: artist {:?} is denylisted", video_id, record.artist);
            return Ok(None);
        }

        tracing::info!("{} - {}", record.artist, record.track);
        cache.put(video_id, CacheEntry::Resolved(record.clone()));
        Ok(Some(record))
    }

    fn played_enough(
        &self,
        video_id: &str,
        duration_seconds: Option<u64>,
        played: Option<TimeDelta>,
    ) -> bool {
        let enough = should_scrobble(self.config.min_played_fraction, duration_seconds, played);
        if !enough {
            tracing::debug!(
                "Skipping {}: played {:?} of {:?}s",
                video_id,
                played,
                duration_seconds
            );
        }
        enough
    }

    /// Try each tier in order.
    async fn lookup(
        &mut self,
        video_id: &str,
        entry: &HistoryEntry,
    ) -> Result<Option<SourceRecord>> {
        if let Some(found) = self.search_catalog(video_id).await? {
            return Ok(Some(found));
        }

        if entry.source_label != self.config.music_surface_label {
            tracing::debug!("{} is not in the music catalog, skipping", video_id);
            return Ok(None);
        }

        match self.extract(video_id).await {
            Extraction::Found(found) => Ok(Some(found)),
            Extraction::NotFound => {
                self.errors
                    .record(&format!("Error: couldn't find {}", video_id));
                Ok(None)
            }
            Extraction::Unavailable => {
                let found = self.query_index(video_id).await?;
                if found.is_none() {
                    self.errors
                        .record(&format!("Error: {} is unavailable", video_id));
                }
                Ok(found)
            }
        }
    }

    /// Search the catalog for the quoted id and accept only an exact id match.
    async fn search_catalog(&mut self, video_id: &str) -> Result<Option<SourceRecord>> {
        let candidates = self
            .sources
            .catalog
            .search(&format!("\"{}\"", video_id))
            .await
            .map_err(|e| {
                Error::from(e).context(format!("searching the music catalog for {}", video_id))
            })?;

        let Some((position, candidate)) = candidates
            .iter()
            .enumerate()
            .find(|(_, c)| c.video_id.as_deref() == Some(video_id))
        else {
            return Ok(None);
        };

        if position != 0 {
            self.errors
                .record(&format!("{} matched at position {}", video_id, position));
        }
        if candidate.duration_seconds.is_none() {
            self.errors
                .record(&format!("Error: {} missing duration", video_id));
        }

        Ok(Some(SourceRecord::from_candidate(candidate)))
    }

    async fn extract(&mut self, video_id: &str) -> Extraction {
        match self.sources.extractor.extract(video_id).await {
            Ok(video) if video.id == video_id => Extraction::Found(SourceRecord::from_extracted(video)),
            Ok(video) => {
                tracing::warn!("Extractor returned {} for {}", video.id, video_id);
                Extraction::NotFound
            }
            Err(LookupError::Unavailable(reason)) => {
                tracing::debug!("{} unavailable to extractor: {}", video_id, reason);
                Extraction::Unavailable
            }
            Err(e) => {
                tracing::warn!("Extractor failed for {}: {}", video_id, e);
                Extraction::NotFound
            }
        }
    }

    /// Look the id up in the video index. Transport failures are fatal;
    /// API-level failures count as a miss.
    async fn query_index(&mut self, video_id: &str) -> Result<Option<SourceRecord>> {
        let Some(index) = self.sources.index.as_ref() else {
            return Ok(None);
        };

        match index.get_videos(video_id).await {
            Ok(videos) => Ok(videos.into_iter().next().map(SourceRecord::from_indexed)),
            Err(e @ LookupError::Network(_)) => Err(Error::from(e)
                .context(format!("querying the video index for {}", video_id))),
            Err(e) => {
                tracing::warn!("Video index lookup failed for {}: {}", video_id, e);
                Ok(None)
            }
        }
    }

    /// Build the record for a source hit.
    async fn attribute(&self, video_id: &str, found: SourceRecord) -> ResolvedRecord {
        if found.is_music_release {
            return ResolvedRecord {
                artist: join_artists(&found.artists),
                track: catalog_track_name(&found.title).to_string(),
                album: found.album,
                duration_seconds: found.duration_seconds,
                confidence: Confidence::Catalog,
            };
        }

        let title = match self.title_override(video_id).await {
            Some(branded) => {
                tracing::debug!("Using community title {:?} for {}", branded, video_id);
                branded
            }
            None => found.title,
        };
        let channel = found.artists.first().map(String::as_str).unwrap_or("");
        let (artist, track) = title::parse(channel, &title);

        ResolvedRecord {
            artist,
            track,
            album: found.album,
            duration_seconds: found.duration_seconds,
            confidence: Confidence::Parsed,
        }
    }

    async fn title_override(&self, video_id: &str) -> Option<String> {
        let titles = self.sources.titles.as_ref()?;
        match titles.branded_title(video_id).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!("Title override lookup failed for {}: {}", video_id, e);
                None
            }
        }
    }
}
