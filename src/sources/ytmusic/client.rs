//! YouTube Music HTTP client
//!
//! Talks to the InnerTube API behind music.youtube.com. Requests carry the
//! `WEB_REMIX` client context, which is what the web app sends.

use serde_json::Value;

use super::{adapter, dto};
use crate::sources::domain::{CatalogCandidate, LookupError};

const BASE_URL: &str = "https://music.youtube.com/youtubei/v1";
const ORIGIN: &str = "https://music.youtube.com";
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20240904.01.01";

const USER_AGENT: &str = concat!("takeout-scrobbler/", env!("CARGO_PKG_VERSION"));

/// YouTube Music search client
pub struct YtMusicClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl YtMusicClient {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_base_url(BASE_URL)
    }

    /// Create a client against a different endpoint root
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| LookupError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Search the catalog and return candidates in result order
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogCandidate>, LookupError> {
        let response = self.send_search_request(query).await?;
        Ok(adapter::to_candidates(&response))
    }

    async fn send_search_request(&self, query: &str) -> Result<Value, LookupError> {
        let url = format!("{}/search?alt=json", self.base_url);
        let body = dto::SearchRequest {
            context: dto::RequestContext {
                client: dto::ClientInfo {
                    client_name: CLIENT_NAME.to_string(),
                    client_version: CLIENT_VERSION.to_string(),
                    hl: "en".to_string(),
                },
            },
            query,
        };

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::ORIGIN, ORIGIN)
            .header(reqwest::header::REFERER, ORIGIN)
            .json(&body)
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

        response
            .json::<Value>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }
}
