//! Filmot HTTP client

use super::dto;
use crate::sources::domain::{IndexedVideo, LookupError};

const BASE_URL: &str = "https://filmot.com/api";

const USER_AGENT: &str = concat!("takeout-scrobbler/", env!("CARGO_PKG_VERSION"));

/// Filmot API client
pub struct FilmotClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FilmotClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LookupError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Look up a video id. An unknown id yields an empty list.
    pub async fn get_videos(&self, video_id: &str) -> Result<Vec<IndexedVideo>, LookupError> {
        let url = format!(
            "{}/getvideos?key={}&id={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(video_id)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }

        if !status.is_success() {
            return Err(LookupError::Api(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let videos = response
            .json::<Vec<dto::Video>>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(videos.into_iter().map(IndexedVideo::from).collect())
    }
}
