//! Acceptance and attribution policy shared by fresh and cached lookups.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::config::ScrobbleConfig;

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Fraction of a track that must have played before the next entry
    pub min_played_fraction: f64,
    /// History header of the music surface; only these entries reach the extractor
    pub music_surface_label: String,
    pub denylist: Denylist,
}

impl ResolverConfig {
    pub fn from_config(config: &ScrobbleConfig) -> Self {
        Self {
            min_played_fraction: config.min_played_fraction,
            music_surface_label: config.music_surface_label.clone(),
            denylist: Denylist::new(config.denied_artists.iter().cloned()),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from_config(&ScrobbleConfig::default())
    }
}

/// Attributed artist names that are never scrobbled. Matching is exact.
#[derive(Debug, Clone, Default)]
pub struct Denylist(HashSet<String>);

impl Denylist {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self(names.into_iter().collect())
    }

    pub fn contains(&self, artist: &str) -> bool {
        self.0.contains(artist)
    }
}

/// Tracks the time between consecutive watchable entries.
///
/// History is newest first, so the gap before the next (newer) watch is the
/// previous timestamp minus the current one.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    previous: Option<DateTime<FixedOffset>>,
}

impl PlaybackClock {
    /// Record `timestamp` and return the time the entry could have played.
    /// `None` means unbounded (the newest entry).
    pub fn observe(&mut self, timestamp: DateTime<FixedOffset>) -> Option<TimeDelta> {
        let delta = self.previous.map(|previous| previous - timestamp);
        self.previous = Some(timestamp);
        delta
    }
}

/// Whether enough of the track played before the next watch started.
///
/// Unknown and zero durations always pass.
pub fn should_scrobble(
    min_played_fraction: f64,
    duration_seconds: Option<u64>,
    played: Option<TimeDelta>,
) -> bool {
    let (Some(duration), Some(played)) = (duration_seconds, played) else {
        return true;
    };
    let required = min_played_fraction * duration as f64;
    let played = played.num_milliseconds() as f64 / 1000.0;
    required <= played
}

/// Join catalog artists: `A`, `A & B`, `A, B & C`.
pub fn join_artists(artists: &[String]) -> String {
    match artists {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} & {}", init.join(", "), last),
    }
}

/// Catalog titles of the form `Artist - Track` carry the track after the
/// single separator; anything else is used whole.
pub fn catalog_track_name(title: &str) -> &str {
    match title.split_once(" - ") {
        Some((_, track)) if !track.contains(" - ") => track,
        _ => title,
    }
}
