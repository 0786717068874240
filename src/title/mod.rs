//! Artist/track extraction from free-form video titles.
//!
//! Two stages, both pure and deterministic:
//! - [`normalize`] strips annotation noise (genre tags, track numbers,
//!   "Official Music Video", "MV", lyric markers, anime credit blocks)
//! - [`split`] runs an ordered rule cascade over the cleaned title and
//!   falls back to the channel name when nothing matches
//!
//! The conventions follow the ones web-scrobbler recognises for music video
//! titles, including the Japanese bracket forms.
//!
//! # Example
//!
//! ```ignore
//! let (artist, track) = title::parse("Some Channel", "【東方】Artist - Track (Official Music Video)");
//! assert_eq!((artist.as_str(), track.as_str()), ("Artist", "Track"));
//! ```

mod normalize;
mod split;

pub use normalize::normalize;
pub use split::{SplitRule, split, split_with_rule};

/// Result of applying one rule in a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Matched { artist: String, track: String },
    NoMatch,
}

/// Normalize `title`, then split it into `(artist, track)`.
pub fn parse(channel: &str, title: &str) -> (String, String) {
    let cleaned = normalize(title);
    tracing::debug!(raw = title, cleaned = %cleaned, "parsing title");
    split(channel, &cleaned)
}
