//! Flat metadata extraction using yt-dlp
//!
//! Shells out to the `yt-dlp` command-line tool and reads the single JSON
//! document it prints with `--dump-json`. Nothing is downloaded.
//!
//! Install yt-dlp:
//! - Windows: `winget install yt-dlp`
//! - macOS: `brew install yt-dlp`
//! - Linux: `pipx install yt-dlp` or your package manager
//!
//! A non-zero exit means yt-dlp could not reach the video (private, removed,
//! region locked), which the resolver answers with a video-index lookup.

use std::process::Command;

use crate::sources::domain::{ExtractedVideo, LookupError, whole_seconds};

/// yt-dlp subprocess wrapper
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    program: String,
}

impl YtDlpExtractor {
    /// `program` is a bare command name looked up in PATH, or a full path.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Extract metadata for one video id.
    pub async fn extract(&self, video_id: &str) -> Result<ExtractedVideo, LookupError> {
        let program = self.program.clone();
        let id = video_id.to_string();
        tokio::task::spawn_blocking(move || run_ytdlp(&program, &id))
            .await
            .map_err(|e| LookupError::Extractor(format!("yt-dlp task failed: {}", e)))?
    }

    /// Version string, `None` when the executable can't be run
    pub fn version(&self) -> Option<String> {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    }
}

fn run_ytdlp(program: &str, video_id: &str) -> Result<ExtractedVideo, LookupError> {
    let output = Command::new(program)
        .args(["--dump-json", "--flat-playlist", "--no-warnings", "--"])
        .arg(video_id)
        .output()
        .map_err(|e| LookupError::Extractor(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LookupError::Unavailable(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_output(&stdout)
}

/// Parse the JSON document yt-dlp prints
fn parse_output(json: &str) -> Result<ExtractedVideo, LookupError> {
    let parsed: YtDlpOutput = serde_json::from_str(json.trim())
        .map_err(|e| LookupError::Parse(format!("Failed to parse yt-dlp output: {}", e)))?;

    let artists = match parsed.artists {
        Some(artists) if !artists.is_empty() => artists,
        _ => parsed.artist.into_iter().collect(),
    };

    Ok(ExtractedVideo {
        id: parsed.id,
        title: parsed.title,
        artists,
        album: parsed.album,
        duration_seconds: whole_seconds(parsed.duration),
    })
}

/// The subset of yt-dlp's info dict we read
#[derive(serde::Deserialize)]
struct YtDlpOutput {
    id: String,
    #[serde(default)]
    title: String,
    /// Present on music videos with structured metadata
    artists: Option<Vec<String>>,
    /// Older releases only report a joined artist string
    artist: Option<String>,
    album: Option<String>,
    duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_music_video() {
        let json = r#"{"id": "abc", "title": "Song", "artists": ["A", "B"],
            "album": "LP", "duration": 212.6, "formats": []}"#;

        let video = parse_output(json).unwrap();

        assert_eq!(video.id, "abc");
        assert_eq!(video.title, "Song");
        assert_eq!(video.artists, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(video.album.as_deref(), Some("LP"));
        assert_eq!(video.duration_seconds, Some(213));
    }

    #[test]
    fn test_parse_plain_video() {
        let json = r#"{"id": "xyz", "title": "Vlog", "duration": 60}"#;

        let video = parse_output(json).unwrap();

        assert!(video.artists.is_empty());
        assert_eq!(video.album, None);
        assert_eq!(video.duration_seconds, Some(60));
    }

    #[test]
    fn test_parse_single_artist_string() {
        let json = r#"{"id": "v", "title": "T", "artist": "Solo"}"#;
        assert_eq!(parse_output(json).unwrap().artists, vec!["Solo".to_string()]);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_output("ERROR"), Err(LookupError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_executable_is_extractor_error() {
        let extractor = YtDlpExtractor::new("/nonexistent/yt-dlp");
        let result = extractor.extract("abc").await;
        assert!(matches!(result, Err(LookupError::Extractor(_))));
        assert!(extractor.version().is_none());
    }
}
