//! Metadata sources used to attribute a video id.
//!
//! # Architecture
//!
//! Same separation for every provider:
//! - **Domain models** (`domain.rs`) - what the resolver works with
//! - **DTOs** (`*/dto.rs`) - exact response shapes of each service
//! - **Adapters** - DTO to domain conversion
//! - **Clients** - HTTP or subprocess access
//! - **Traits** (`traits.rs`) - seams for the resolver and for test mocks
//!
//! # Tiers
//!
//! 1. [`ytmusic`] - YouTube Music catalog search (structured metadata)
//! 2. [`ytdlp`] - yt-dlp flat extraction, music-surface entries only
//! 3. [`filmot`] - Filmot video index, for videos yt-dlp reports unavailable
//!
//! [`dearrow`] is not a tier; it supplies community titles that replace
//! clickbait titles before they are parsed.

pub mod dearrow;
pub mod domain;
pub mod filmot;
pub mod traits;
pub mod ytdlp;
pub mod ytmusic;

use std::sync::Arc;

pub use domain::{
    CatalogCandidate, ExtractedVideo, IndexedVideo, LookupError, SourceKind, SourceRecord,
};
pub use traits::{MusicCatalogApi, TitleOverrideApi, VideoExtractorApi, VideoIndexApi};

use crate::config::Config;

/// The set of sources a resolver consults.
#[derive(Clone)]
pub struct Sources {
    pub catalog: Arc<dyn MusicCatalogApi>,
    pub extractor: Arc<dyn VideoExtractorApi>,
    /// Absent when no Filmot API key is configured
    pub index: Option<Arc<dyn VideoIndexApi>>,
    /// Absent when title overrides are disabled
    pub titles: Option<Arc<dyn TitleOverrideApi>>,
}

impl Sources {
    /// Build the production clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        let index: Option<Arc<dyn VideoIndexApi>> = match &config.credentials.filmot_api_key {
            Some(key) if !key.is_empty() => Some(Arc::new(filmot::FilmotClient::new(key)?)),
            _ => {
                tracing::warn!("No Filmot API key configured, unavailable videos will be skipped");
                None
            }
        };

        let titles: Option<Arc<dyn TitleOverrideApi>> = if config.sources.use_title_overrides {
            Some(Arc::new(dearrow::DeArrowClient::new()?))
        } else {
            None
        };

        Ok(Self {
            catalog: Arc::new(ytmusic::YtMusicClient::new()?),
            extractor: Arc::new(ytdlp::YtDlpExtractor::new(&config.sources.ytdlp_path)),
            index,
            titles,
        })
    }
}
