//! Trait definitions for metadata sources.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real clients, while tests substitute the mock
//! implementations below.
//!
//! # Example
//!
//! ```ignore
//! use takeout_scrobbler::sources::traits::MusicCatalogApi;
//!
//! async fn first_hit<T: MusicCatalogApi>(client: &T, id: &str) -> Option<CatalogCandidate> {
//!     client.search(id).await.ok()?.into_iter().next()
//! }
//! ```

use async_trait::async_trait;

use super::domain::{CatalogCandidate, ExtractedVideo, IndexedVideo, LookupError};

/// Music catalog search.
#[async_trait]
pub trait MusicCatalogApi: Send + Sync {
    /// Run a free-text search and return every candidate in result order.
    async fn search(&self, query: &str) -> Result<Vec<CatalogCandidate>, LookupError>;
}

/// Flat metadata extraction for a single video.
#[async_trait]
pub trait VideoExtractorApi: Send + Sync {
    /// Extract metadata; [`LookupError::Unavailable`] means the video can't
    /// be reached through the usual routes.
    async fn extract(&self, video_id: &str) -> Result<ExtractedVideo, LookupError>;
}

/// Index of historical video metadata, keyed by video id.
#[async_trait]
pub trait VideoIndexApi: Send + Sync {
    async fn get_videos(&self, video_id: &str) -> Result<Vec<IndexedVideo>, LookupError>;
}

/// Replacement titles for videos with misleading titles.
#[async_trait]
pub trait TitleOverrideApi: Send + Sync {
    async fn branded_title(&self, video_id: &str) -> Result<Option<String>, LookupError>;
}

// Implement traits for real clients

#[async_trait]
impl MusicCatalogApi for super::ytmusic::YtMusicClient {
    async fn search(&self, query: &str) -> Result<Vec<CatalogCandidate>, LookupError> {
        self.search(query).await
    }
}

#[async_trait]
impl VideoExtractorApi for super::ytdlp::YtDlpExtractor {
    async fn extract(&self, video_id: &str) -> Result<ExtractedVideo, LookupError> {
        self.extract(video_id).await
    }
}

#[async_trait]
impl VideoIndexApi for super::filmot::FilmotClient {
    async fn get_videos(&self, video_id: &str) -> Result<Vec<IndexedVideo>, LookupError> {
        self.get_videos(video_id).await
    }
}

#[async_trait]
impl TitleOverrideApi for super::dearrow::DeArrowClient {
    async fn branded_title(&self, video_id: &str) -> Result<Option<String>, LookupError> {
        self.branded_title(video_id).await
    }
}
