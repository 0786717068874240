//! YouTube Music InnerTube Data Transfer Objects
//!
//! These types match the renderer objects the search endpoint returns.
//! Only the fields we read are declared; serde ignores the rest.
//! DO NOT use these types outside the ytmusic module - convert to domain types.
//!
//! Search responses nest result renderers several levels deep inside tab and
//! shelf renderers whose layout changes between experiments, so the adapter
//! locates renderers by key and only the renderers themselves are typed.
//!
//! Example list item (trimmed):
//! ```json
//! {
//!   "playlistItemData": {"videoId": "dQw4w9WgXcQ"},
//!   "flexColumns": [
//!     {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [
//!       {"text": "Never Gonna Give You Up", "navigationEndpoint": {"watchEndpoint": {
//!         "videoId": "dQw4w9WgXcQ",
//!         "watchEndpointMusicSupportedConfigs": {"watchEndpointMusicConfig": {
//!           "musicVideoType": "MUSIC_VIDEO_TYPE_OMV"}}}}}
//!     ]}}},
//!     {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [
//!       {"text": "Song"}, {"text": " • "},
//!       {"text": "Rick Astley", "navigationEndpoint": {"browseEndpoint": {
//!         "browseId": "UCuAXFkgsw1L7xaCfnd5JJOw",
//!         "browseEndpointContextSupportedConfigs": {"browseEndpointContextMusicConfig": {
//!           "pageType": "MUSIC_PAGE_TYPE_ARTIST"}}}}},
//!       {"text": " • "}, {"text": "3:33"}
//!     ]}}}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Key of a list item renderer (songs, videos, episodes).
pub const LIST_ITEM_KEY: &str = "musicResponsiveListItemRenderer";

/// Key of the "top result" card renderer.
pub const CARD_SHELF_KEY: &str = "musicCardShelfRenderer";

/// Page type of an artist link.
pub const ARTIST_PAGE: &str = "MUSIC_PAGE_TYPE_ARTIST";

/// Page type of an album link.
pub const ALBUM_PAGE: &str = "MUSIC_PAGE_TYPE_ALBUM";

// ============================================================================
// Request
// ============================================================================

/// Search request body
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub context: RequestContext,
    pub query: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub client_name: String,
    pub client_version: String,
    pub hl: String,
}

// ============================================================================
// Response renderers
// ============================================================================

/// A song/video row in a results shelf
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemRenderer {
    #[serde(default)]
    pub flex_columns: Vec<FlexColumn>,
    pub playlist_item_data: Option<PlaylistItemData>,
    pub overlay: Option<Overlay>,
}

/// The highlighted top result
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardShelfRenderer {
    pub title: Option<Text>,
    pub subtitle: Option<Text>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlexColumn {
    #[serde(rename = "musicResponsiveListItemFlexColumnRenderer")]
    pub renderer: FlexColumnRenderer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlexColumnRenderer {
    pub text: Option<Text>,
}

/// Formatted text made of runs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: String,
    pub navigation_endpoint: Option<NavigationEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEndpoint {
    pub browse_endpoint: Option<BrowseEndpoint>,
    pub watch_endpoint: Option<WatchEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseEndpoint {
    pub browse_id: Option<String>,
    pub browse_endpoint_context_supported_configs: Option<BrowseConfigs>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseConfigs {
    pub browse_endpoint_context_music_config: Option<BrowseMusicConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseMusicConfig {
    pub page_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEndpoint {
    pub video_id: Option<String>,
    pub watch_endpoint_music_supported_configs: Option<WatchConfigs>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfigs {
    pub watch_endpoint_music_config: Option<WatchMusicConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchMusicConfig {
    pub music_video_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemData {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub music_item_thumbnail_overlay_renderer: Option<ThumbnailOverlayRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailOverlayRenderer {
    pub content: Option<OverlayContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayContent {
    pub music_play_button_renderer: Option<PlayButtonRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayButtonRenderer {
    pub play_navigation_endpoint: Option<NavigationEndpoint>,
}

impl Run {
    /// Page type of the run's browse link, if any.
    pub fn page_type(&self) -> Option<&str> {
        self.navigation_endpoint
            .as_ref()?
            .browse_endpoint
            .as_ref()?
            .browse_endpoint_context_supported_configs
            .as_ref()?
            .browse_endpoint_context_music_config
            .as_ref()?
            .page_type
            .as_deref()
    }

    pub fn watch_endpoint(&self) -> Option<&WatchEndpoint> {
        self.navigation_endpoint.as_ref()?.watch_endpoint.as_ref()
    }
}

impl WatchEndpoint {
    pub fn music_video_type(&self) -> Option<&str> {
        self.watch_endpoint_music_supported_configs
            .as_ref()?
            .watch_endpoint_music_config
            .as_ref()?
            .music_video_type
            .as_deref()
    }
}

impl ListItemRenderer {
    /// Runs of the n-th flex column (empty when missing).
    pub fn column_runs(&self, index: usize) -> &[Run] {
        self.flex_columns
            .get(index)
            .and_then(|c| c.renderer.text.as_ref())
            .map(|t| t.runs.as_slice())
            .unwrap_or_default()
    }

    /// Watch endpoint behind the thumbnail's play button.
    pub fn play_endpoint(&self) -> Option<&WatchEndpoint> {
        self.overlay
            .as_ref()?
            .music_item_thumbnail_overlay_renderer
            .as_ref()?
            .content
            .as_ref()?
            .music_play_button_renderer
            .as_ref()?
            .play_navigation_endpoint
            .as_ref()?
            .watch_endpoint
            .as_ref()
    }
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================
