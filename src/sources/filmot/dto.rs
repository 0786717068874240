//! Filmot API Data Transfer Objects
//!
//! These types match EXACTLY what the Filmot API returns.
//! DO NOT use these types outside the filmot module - convert to domain types.
//!
//! API docs: https://filmot.com/api
//!
//! `GET /api/getvideos?key=..&id=..` answers with an array, empty when the
//! id is unknown:
//! ```json
//! [{"id": "dQw4w9WgXcQ", "channelname": "Rick Astley - Topic",
//!   "channelid": "UC...", "title": "Never Gonna Give You Up",
//!   "duration": 213, "uploaddate": "2009-10-25"}]
//! ```

use serde::Deserialize;

use crate::sources::domain::{IndexedVideo, whole_seconds};

/// One video record
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub channelname: String,
    #[serde(default)]
    pub title: String,
    /// Seconds; occasionally reported as a float
    pub duration: Option<f64>,
}

impl From<Video> for IndexedVideo {
    fn from(video: Video) -> Self {
        Self {
            channel_name: video.channelname,
            title: video.title,
            duration_seconds: whole_seconds(video.duration),
        }
    }
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_getvideos_response() {
        let json = r#"[{"id": "abc", "channelname": "Band - Topic", "channelid": "UC1",
            "title": "Song", "duration": 245, "uploaddate": "2015-01-01", "viewcount": 10}]"#;

        let videos: Vec<Video> = serde_json::from_str(json).expect("Should parse");
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].channelname, "Band - Topic");

        let indexed: IndexedVideo = videos[0].clone().into();
        assert_eq!(indexed.duration_seconds, Some(245));
        assert_eq!(indexed.title, "Song");
    }

    #[test]
    fn test_parse_empty_response() {
        let videos: Vec<Video> = serde_json::from_str("[]").unwrap();
        assert!(videos.is_empty());
    }

    #[test]
    fn test_missing_duration() {
        let videos: Vec<Video> =
            serde_json::from_str(r#"[{"channelname": "C", "title": "T"}]"#).unwrap();
        let indexed: IndexedVideo = videos[0].clone().into();
        assert_eq!(indexed.duration_seconds, None);
    }
}
