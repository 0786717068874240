//! Adapter layer: Convert YouTube Music renderers to domain models
//!
//! This is the ONLY place where ytmusic DTO types are converted to domain
//! types. Result renderers are found by key anywhere in the response tree,
//! so a reshuffled shelf layout does not break extraction.

use serde_json::Value;

use super::dto::{self, Run};
use crate::sources::domain::{CatalogCandidate, parse_clock_duration};

/// Result type labels that appear as the first subtitle run.
const ITEM_TYPE_LABELS: [&str; 6] = ["Song", "Video", "Episode", "Podcast", "Album", "Single"];

/// Convert a raw search response into candidates, in result order.
pub fn to_candidates(response: &Value) -> Vec<CatalogCandidate> {
    let mut candidates = Vec::new();
    collect(response, &mut candidates);
    candidates
}

fn collect(value: &Value, out: &mut Vec<CatalogCandidate>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match key.as_str() {
                    dto::LIST_ITEM_KEY => {
                        if let Some(candidate) = parse_renderer::<dto::ListItemRenderer>(child)
                            .and_then(|item| from_list_item(&item))
                        {
                            out.push(candidate);
                        }
                    }
                    dto::CARD_SHELF_KEY => {
                        if let Some(candidate) = parse_renderer::<dto::CardShelfRenderer>(child)
                            .and_then(|card| from_card_shelf(&card))
                        {
                            out.push(candidate);
                        }
                        // The card also holds related items
                        collect(child, out);
                    }
                    _ => collect(child, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        _ => {}
    }
}

fn parse_renderer<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(renderer) => Some(renderer),
        Err(e) => {
            tracing::debug!("Skipping unparseable result renderer: {}", e);
            None
        }
    }
}

fn from_list_item(item: &dto::ListItemRenderer) -> Option<CatalogCandidate> {
    let title_runs = item.column_runs(0);
    let title = joined_text(title_runs);
    if title.is_empty() {
        return None;
    }

    let title_watch = title_runs.iter().find_map(Run::watch_endpoint);
    let play_watch = item.play_endpoint();

    let video_id = item
        .playlist_item_data
        .as_ref()
        .and_then(|d| d.video_id.clone())
        .or_else(|| title_watch.and_then(|w| w.video_id.clone()))
        .or_else(|| play_watch.and_then(|w| w.video_id.clone()));

    let video_type = title_watch
        .and_then(|w| w.music_video_type())
        .or_else(|| play_watch.and_then(|w| w.music_video_type()))
        .map(str::to_string);

    let detail_runs: Vec<&Run> = item
        .flex_columns
        .iter()
        .skip(1)
        .filter_map(|c| c.renderer.text.as_ref())
        .flat_map(|t| t.runs.iter())
        .collect();

    Some(build_candidate(video_id, title, video_type, &detail_runs))
}

fn from_card_shelf(card: &dto::CardShelfRenderer) -> Option<CatalogCandidate> {
    let title_runs = card.title.as_ref().map(|t| t.runs.as_slice()).unwrap_or_default();
    let title = joined_text(title_runs);
    let watch = title_runs.iter().find_map(Run::watch_endpoint)?;
    let video_id = watch.video_id.clone();
    let video_type = watch.music_video_type().map(str::to_string);

    let detail_runs: Vec<&Run> = card
        .subtitle
        .as_ref()
        .map(|t| t.runs.iter().collect())
        .unwrap_or_default();

    Some(build_candidate(video_id, title, video_type, &detail_runs))
}

fn build_candidate(
    video_id: Option<String>,
    title: String,
    video_type: Option<String>,
    detail_runs: &[&Run],
) -> CatalogCandidate {
    let mut artists: Vec<String> = detail_runs
        .iter()
        .filter(|r| r.page_type() == Some(dto::ARTIST_PAGE))
        .map(|r| r.text.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if artists.is_empty() {
        artists.extend(fallback_artist(detail_runs));
    }

    let album = detail_runs
        .iter()
        .find(|r| r.page_type() == Some(dto::ALBUM_PAGE))
        .map(|r| r.text.trim().to_string());

    let duration_seconds = detail_runs
        .iter()
        .rev()
        .find_map(|r| parse_clock_duration(&r.text));

    CatalogCandidate {
        video_id,
        title,
        artists,
        album,
        duration_seconds,
        video_type,
    }
}

/// Unlinked uploader name: the first run that is not a separator, a type
/// label, a play count or a duration.
fn fallback_artist(runs: &[&Run]) -> Option<String> {
    runs.iter()
        .map(|r| r.text.trim())
        .filter(|text| !text.is_empty() && *text != "•" && *text != "&" && *text != ",")
        .filter(|text| !ITEM_TYPE_LABELS.contains(text))
        .filter(|text| !text.ends_with(" views") && !text.ends_with(" plays"))
        .find(|text| parse_clock_duration(text).is_none())
        .map(str::to_string)
}

fn joined_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect::<String>().trim().to_string()
}
