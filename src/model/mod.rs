//! Core data models for a conversion run.
//!
//! - [`HistoryEntry`] - one watch event from the history export
//! - [`ResolvedRecord`] - the attribution of one video id
//! - [`CacheEntry`] - what the resolution cache stores per video id
//! - [`OutputRow`] - one scrobble line in the CSV output
//!
//! # Cache format
//!
//! A cache entry serializes as a 5-element array
//! `[artist, track, album, duration, confidence]`, or `null` for a video
//! that is known to be unresolvable. Older caches wrote unknown durations as
//! `""` and some extractors report fractional seconds; both still load.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One watch event from the history export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Link to the watched item, absent for removed videos
    pub target_url: Option<String>,
    /// Product surface that recorded the event ("YouTube", "YouTube Music")
    pub source_label: String,
    /// Original timestamp text, copied verbatim into the output
    pub time: String,
    /// Parsed timestamp; only entries without a watch link may lack one
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Display title
    pub raw_title: String,
    /// Display channel name
    pub raw_channel: String,
}

impl HistoryEntry {
    /// Video id from the target URL's `v` query parameter.
    ///
    /// Only watch links qualify; posts, channels and search entries yield `None`.
    pub fn video_id(&self) -> Option<String> {
        let url = self.target_url.as_deref()?;
        if !url.contains("watch") {
            return None;
        }
        let parsed = reqwest::Url::parse(url).ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty())
    }
}

/// How an attribution was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confidence {
    /// Taken from structured catalog metadata
    #[default]
    Catalog,
    /// Guessed from the video title
    Parsed,
}

impl Confidence {
    /// The tag written to the cache file.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Catalog => "",
            Self::Parsed => "parsed",
        }
    }

    fn from_tag(tag: &str) -> Self {
        if tag == "parsed" {
            Self::Parsed
        } else {
            Self::Catalog
        }
    }
}

/// Attribution of a single video id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub artist: String,
    pub track: String,
    /// Empty when unknown
    pub album: String,
    pub duration_seconds: Option<u64>,
    pub confidence: Confidence,
}

/// A cache slot for one video id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Resolved(ResolvedRecord),
    /// Looked up before and deliberately left without a record
    Unresolvable,
}

impl CacheEntry {
    pub fn as_record(&self) -> Option<&ResolvedRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Unresolvable => None,
        }
    }
}

impl Serialize for CacheEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Resolved(r) => (
                &r.artist,
                &r.track,
                &r.album,
                r.duration_seconds,
                r.confidence.as_tag(),
            )
                .serialize(serializer),
            Self::Unresolvable => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for CacheEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let row = Option::<CachedRow>::deserialize(deserializer)?;
        Ok(match row {
            Some(CachedRow(artist, track, album, duration, tag)) => {
                Self::Resolved(ResolvedRecord {
                    artist,
                    track,
                    album,
                    duration_seconds: duration.into_seconds(),
                    confidence: Confidence::from_tag(&tag),
                })
            }
            None => Self::Unresolvable,
        })
    }
}

#[derive(Deserialize)]
struct CachedRow(String, String, String, CachedDuration, String);

/// Duration as it may appear in a cache file.
#[derive(Deserialize)]
#[serde(untagged)]
enum CachedDuration {
    Seconds(u64),
    Fractional(f64),
    Text(String),
    Missing(()),
}

impl CachedDuration {
    fn into_seconds(self) -> Option<u64> {
        match self {
            Self::Seconds(s) => Some(s),
            Self::Fractional(f) if f.is_finite() && f >= 0.0 => Some(f.round() as u64),
            Self::Text(t) => t
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64),
            _ => None,
        }
    }
}

/// One scrobble line: artist, album, track, timestamp, (empty), duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub artist: String,
    pub album: String,
    pub track: String,
    pub timestamp: String,
    pub duration: String,
}

impl OutputRow {
    pub fn new(record: &ResolvedRecord, entry: &HistoryEntry) -> Self {
        Self {
            artist: record.artist.clone(),
            album: record.album.clone(),
            track: record.track.clone(),
            timestamp: entry.time.clone(),
            duration: format_duration(record.duration_seconds),
        }
    }

    /// Columns in output order.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.artist,
            &self.album,
            &self.track,
            &self.timestamp,
            "",
            &self.duration,
        ]
    }
}

/// Format seconds as `HH:MM:SS`; unknown or zero durations become empty.
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        None | Some(0) => String::new(),
        Some(total) => {
            let (minutes, seconds) = (total / 60, total % 60);
            let (hours, minutes) = (minutes / 60, minutes % 60);
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}
