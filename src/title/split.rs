//! Title splitting: first-match-wins rule cascade.
//!
//! Rules run most specific first. A bare separator split would misfire on
//! titles that also carry a colon or dash inside the artist or track name,
//! so it only runs after the quoted and bracketed forms have had their turn.

use std::sync::LazyLock;

use regex::Regex;

use super::RuleOutcome;

/// The rules of the cascade, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// `Artist - "Track"`, `Artist: "Track"`, `Artist "Track"`
    QuotedTrack,
    /// `Artist「Track」`, `Artist『Track』`, `Artist｢Track｣`
    JapaneseBracket,
    /// `Track (cover by Artist)`
    ByArtist,
    /// `Artist - Track` and friends, exactly one separator
    Separator,
    /// `Track【Artist】`
    TrailingBracket,
    /// Nothing matched: channel name and the whole title
    Fallback,
}

const CASCADE: [SplitRule; 5] = [
    SplitRule::QuotedTrack,
    SplitRule::JapaneseBracket,
    SplitRule::ByArtist,
    SplitRule::Separator,
    SplitRule::TrailingBracket,
];

/// A regex rule with the capture groups holding artist and track.
struct CaptureRule {
    pattern: Regex,
    artist_group: usize,
    track_group: usize,
}

impl CaptureRule {
    fn new(pattern: &str, artist_group: usize, track_group: usize) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("split pattern must compile"),
            artist_group,
            track_group,
        }
    }

    fn apply(&self, title: &str) -> RuleOutcome {
        let Some(caps) = self.pattern.captures(title) else {
            return RuleOutcome::NoMatch;
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str().trim()).unwrap_or_default();
        matched(group(self.artist_group), group(self.track_group))
    }
}

static QUOTED_TRACK: LazyLock<CaptureRule> =
    LazyLock::new(|| CaptureRule::new(r#"(.+?)([\s:—\-])+\s*"(.+?)""#, 1, 3));

static JAPANESE_BRACKET: LazyLock<CaptureRule> =
    LazyLock::new(|| CaptureRule::new(r"(.+?)[『｢「](.+?)[」｣』]", 1, 2));

static BY_ARTIST: LazyLock<CaptureRule> =
    LazyLock::new(|| CaptureRule::new(r"(\w[\s\w]*?)\s+\([^)]*\s*by\s*([^)]+)+\)", 2, 1));

static TRAILING_BRACKET: LazyLock<CaptureRule> =
    LazyLock::new(|| CaptureRule::new(r"(.+?)【(.+?)】", 2, 1));

/// Spaced variants come first so `A - B` splits on ` - ` rather than `-`.
const SEPARATORS: [&str; 14] = [
    " -- ", "--", " ~ ", " - ", " \u{2013} ", " \u{2014} ", " // ", "-", "\u{2013}", "\u{2014}",
    ":", "|", "///", "~",
];

static SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = SEPARATORS.iter().map(|s| regex::escape(s)).collect();
    Regex::new(&alternatives.join("|")).expect("separator pattern must compile")
});

fn matched(artist: &str, track: &str) -> RuleOutcome {
    if artist.is_empty() || track.is_empty() {
        return RuleOutcome::NoMatch;
    }
    RuleOutcome::Matched {
        artist: artist.to_string(),
        track: track.to_string(),
    }
}

/// Split on every separator; only an unambiguous two-part result counts.
fn split_on_separator(title: &str) -> RuleOutcome {
    let parts: Vec<&str> = SEPARATOR_PATTERN.split(title).map(str::trim).collect();
    match parts.as_slice() {
        [artist, track] => matched(artist, track),
        _ => RuleOutcome::NoMatch,
    }
}

impl SplitRule {
    /// Apply this rule alone to an already normalized title.
    pub fn apply(self, title: &str) -> RuleOutcome {
        match self {
            Self::QuotedTrack => QUOTED_TRACK.apply(title),
            Self::JapaneseBracket => JAPANESE_BRACKET.apply(title),
            Self::ByArtist => BY_ARTIST.apply(title),
            Self::Separator => split_on_separator(title),
            Self::TrailingBracket => TRAILING_BRACKET.apply(title),
            Self::Fallback => RuleOutcome::NoMatch,
        }
    }
}

/// Split a normalized title into `(artist, track)`, reporting the rule used.
pub fn split_with_rule(channel: &str, title: &str) -> (SplitRule, String, String) {
    for rule in CASCADE {
        if let RuleOutcome::Matched { artist, track } = rule.apply(title) {
            return (rule, artist, track);
        }
    }
    (SplitRule::Fallback, channel.to_string(), title.to_string())
}

/// Split a normalized title into `(artist, track)`.
///
/// Never fails: when no rule matches the channel name becomes the artist
/// and the title is used verbatim as the track.
pub fn split(channel: &str, title: &str) -> (String, String) {
    let (_, artist, track) = split_with_rule(channel, title);
    (artist, track)
}
