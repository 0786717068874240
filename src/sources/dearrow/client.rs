//! DeArrow HTTP client

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use super::dto;
use crate::sources::domain::LookupError;

const BASE_URL: &str = "https://sponsor.ajay.app/api";

const USER_AGENT: &str = concat!("takeout-scrobbler/", env!("CARGO_PKG_VERSION"));

/// Hex digits of the hashed id sent to the server
const HASH_PREFIX_LEN: usize = 4;

/// A `>` glued to the start of a word asks clients to keep its casing.
static CASE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)>(\S)").expect("valid regex"));

/// DeArrow branding client
pub struct DeArrowClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DeArrowClient {
    pub fn new() -> Result<Self, LookupError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// The community title for `video_id`, if one is trusted.
    pub async fn branded_title(&self, video_id: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}/branding/{}", self.base_url, hash_prefix(video_id));

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        // No video under this prefix has branding
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }

        if !status.is_success() {
            return Err(LookupError::Api(format!("HTTP {}", status)));
        }

        let branding = response
            .json::<dto::BrandingResponse>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(pick_title(&branding, video_id))
    }
}

fn hash_prefix(video_id: &str) -> String {
    let digest = Sha256::digest(video_id.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..HASH_PREFIX_LEN].to_string()
}

fn pick_title(branding: &dto::BrandingResponse, video_id: &str) -> Option<String> {
    let title = branding
        .get(video_id)?
        .titles
        .iter()
        .find(|t| t.is_trusted())?;
    Some(strip_case_markers(&title.title))
}

fn strip_case_markers(title: &str) -> String {
    CASE_MARKER.replace_all(title, "${1}${2}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_prefix() {
        assert_eq!(hash_prefix("dQw4w9WgXcQ"), "5f6b");
    }

    #[test]
    fn test_strip_case_markers() {
        assert_eq!(strip_case_markers(">Rick Astley - >Never Gonna"), "Rick Astley - Never Gonna");
        assert_eq!(strip_case_markers("a > b"), "a > b");
        assert_eq!(strip_case_markers("x->y"), "x->y");
    }

    #[test]
    fn test_pick_title_skips_downvoted() {
        let branding: dto::BrandingResponse = serde_json::from_str(
            r#"{"vid": {"titles": [
                {"title": "Bad", "votes": -1, "locked": false},
                {"title": ">Artist - Song", "votes": 1, "locked": false}
            ]}, "other": {"titles": [{"title": "Nope", "votes": 5, "locked": false}]}}"#,
        )
        .unwrap();

        assert_eq!(pick_title(&branding, "vid").as_deref(), Some("Artist - Song"));
        assert_eq!(pick_title(&branding, "missing"), None);
    }

    #[test]
    fn test_pick_title_none_trusted() {
        let branding: dto::BrandingResponse = serde_json::from_str(
            r#"{"vid": {"titles": [{"title": "Bad", "votes": -1, "locked": false}]}}"#,
        )
        .unwrap();
        assert_eq!(pick_title(&branding, "vid"), None);
    }
}
