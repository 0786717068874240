//! DeArrow API Data Transfer Objects
//!
//! These types match EXACTLY what the DeArrow branding API returns.
//! DO NOT use these types outside the dearrow module.
//!
//! API docs: https://wiki.sponsor.ajay.app/w/API_Docs/DeArrow
//!
//! `GET /api/branding/<sha256 prefix>` returns every video whose hashed id
//! shares the prefix:
//! ```json
//! {"dQw4w9WgXcQ": {
//!   "titles": [{"title": "Rick Astley - Never Gonna Give You Up",
//!               "original": false, "votes": 3, "locked": false, "UUID": "..."}],
//!   "thumbnails": [], "randomTime": 0.5, "videoDuration": 213.0}}
//! ```

use std::collections::HashMap;

use serde::Deserialize;

/// Branding response keyed by video id
pub type BrandingResponse = HashMap<String, VideoBranding>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoBranding {
    #[serde(default)]
    pub titles: Vec<BrandingTitle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingTitle {
    pub title: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub locked: bool,
}

impl BrandingTitle {
    /// Titles with negative votes are shown to nobody unless locked.
    pub fn is_trusted(&self) -> bool {
        self.votes >= 0 || self.locked
    }
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
