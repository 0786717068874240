//! Google Takeout watch-history reader.
//!
//! Takeout exports YouTube and YouTube Music history as one JSON array,
//! newest first:
//!
//! ```json
//! [{"header": "YouTube Music",
//!   "title": "Watched Never Gonna Give You Up",
//!   "titleUrl": "https://music.youtube.com/watch?v=dQw4w9WgXcQ",
//!   "subtitles": [{"name": "Rick Astley - Topic", "url": "https://..."}],
//!   "time": "2024-03-01T12:00:00.123Z",
//!   "products": ["YouTube"]}]
//! ```
//!
//! Removed videos have no `titleUrl` and no `subtitles`; they are kept so
//! positions match the export, but they never resolve. A `time` that doesn't
//! parse fails the load only on watch entries.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::DateTime;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::HistoryEntry;

const WATCHED_PREFIX: &str = "Watched ";

/// One activity record as Takeout writes it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TakeoutActivity {
    #[serde(default)]
    header: String,
    #[serde(default)]
    title: String,
    title_url: Option<String>,
    #[serde(default)]
    subtitles: Vec<Subtitle>,
    time: String,
}

#[derive(Debug, Deserialize)]
struct Subtitle {
    #[serde(default)]
    name: String,
}

/// Read a `watch-history.json` file.
pub fn load(path: &Path) -> Result<Vec<HistoryEntry>> {
    let file = File::open(path).map_err(|e| Error::history(path, e.to_string()))?;
    let activities: Vec<TakeoutActivity> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::history(path, e.to_string()))?;

    let entries = convert(activities, path)?;
    tracing::info!("Read {} history entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Decode history from a JSON string.
pub fn parse(json: &str) -> Result<Vec<HistoryEntry>> {
    let activities: Vec<TakeoutActivity> = serde_json::from_str(json)?;
    convert(activities, Path::new("<input>"))
}

fn convert(activities: Vec<TakeoutActivity>, path: &Path) -> Result<Vec<HistoryEntry>> {
    activities
        .into_iter()
        .enumerate()
        .map(|(index, activity)| {
            to_entry(activity)
                .map_err(|message| Error::history(path, format!("entry {index}: {message}")))
        })
        .collect()
}

fn to_entry(activity: TakeoutActivity) -> std::result::Result<HistoryEntry, String> {
    let timestamp = match DateTime::parse_from_rfc3339(&activity.time) {
        Ok(timestamp) => Some(timestamp),
        Err(e) if is_watch_link(activity.title_url.as_deref()) => {
            return Err(format!("bad time {:?}: {}", activity.time, e));
        }
        Err(e) => {
            tracing::debug!("Ignoring bad time {:?} on a non-watch entry: {}", activity.time, e);
            None
        }
    };

    let raw_title = activity
        .title
        .strip_prefix(WATCHED_PREFIX)
        .unwrap_or(&activity.title)
        .to_string();

    let raw_channel = activity
        .subtitles
        .into_iter()
        .next()
        .map(|s| s.name)
        .unwrap_or_default();

    Ok(HistoryEntry {
        target_url: activity.title_url,
        source_label: activity.header,
        time: activity.time,
        timestamp,
        raw_title,
        raw_channel,
    })
}

/// Entries that can resolve need a usable time; everything else may lack one.
fn is_watch_link(url: Option<&str>) -> bool {
    url.is_some_and(|u| u.contains("watch"))
}
