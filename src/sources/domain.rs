//! Internal domain models for metadata lookups.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external responses get converted into these types via adapters.

/// Video types the catalog uses for official releases
/// (audio tracks and official music videos).
pub const MUSIC_RELEASE_VIDEO_TYPES: [&str; 2] = ["MUSIC_VIDEO_TYPE_ATV", "MUSIC_VIDEO_TYPE_OMV"];

/// One search hit from the music catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogCandidate {
    /// Absent for non-video results (artists, albums, playlists)
    pub video_id: Option<String>,
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<u64>,
    pub video_type: Option<String>,
}

impl CatalogCandidate {
    /// Whether the catalog lists this video as an official music release.
    pub fn is_music_release(&self) -> bool {
        self.video_type
            .as_deref()
            .is_some_and(|t| MUSIC_RELEASE_VIDEO_TYPES.contains(&t))
    }
}

/// Metadata from the flat extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedVideo {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<u64>,
}

/// One record from the video index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedVideo {
    pub channel_name: String,
    pub title: String,
    pub duration_seconds: Option<u64>,
}

/// Which tier produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    MusicCatalog,
    Extractor,
    VideoIndex,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MusicCatalog => "music catalog",
            Self::Extractor => "extractor",
            Self::VideoIndex => "video index",
        };
        f.write_str(name)
    }
}

/// A positive identification from any tier, before attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub source: SourceKind,
    pub title: String,
    pub artists: Vec<String>,
    /// Empty when unknown
    pub album: String,
    pub duration_seconds: Option<u64>,
    /// Official release: take artist and track verbatim instead of parsing
    pub is_music_release: bool,
}

impl SourceRecord {
    pub fn from_candidate(candidate: &CatalogCandidate) -> Self {
        Self {
            source: SourceKind::MusicCatalog,
            title: candidate.title.clone(),
            artists: candidate.artists.clone(),
            album: candidate.album.clone().unwrap_or_default(),
            duration_seconds: candidate.duration_seconds,
            is_music_release: candidate.is_music_release(),
        }
    }

    pub fn from_extracted(video: ExtractedVideo) -> Self {
        let album = video.album.unwrap_or_default();
        Self {
            source: SourceKind::Extractor,
            title: video.title,
            artists: video.artists,
            is_music_release: !album.is_empty(),
            album,
            duration_seconds: video.duration_seconds,
        }
    }

    pub fn from_indexed(video: IndexedVideo) -> Self {
        let channel = video
            .channel_name
            .strip_suffix(" - Topic")
            .unwrap_or(&video.channel_name)
            .to_string();
        Self {
            source: SourceKind::VideoIndex,
            title: video.title,
            artists: vec![channel],
            album: String::new(),
            duration_seconds: video.duration_seconds,
            is_music_release: false,
        }
    }
}

/// Errors that can occur while querying a source
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    /// The extractor says the video cannot be reached through normal means
    #[error("Video unavailable: {0}")]
    Unavailable(String),

    #[error("Extractor failed: {0}")]
    Extractor(String),
}

/// Parse a `m:ss` or `h:mm:ss` display duration into seconds.
pub fn parse_clock_duration(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    parts.iter().try_fold(0u64, |total, part| {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(total * 60 + part.parse::<u64>().ok()?)
    })
}

/// Round a fractional duration reported by a service.
pub fn whole_seconds(seconds: Option<f64>) -> Option<u64> {
    seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s.round() as u64)
}
