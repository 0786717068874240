//! Durable resolution cache.
//!
//! Maps video ids to their [`CacheEntry`], persisted as a single JSON object
//! (see [`crate::model`] for the entry format). The cache is the only state
//! that survives between runs, which is what makes a run resumable: every id
//! resolved before a crash or interrupt is skipped on the next run.
//!
//! Writes are atomic (temp file, then rename). Unflushed changes are also
//! written when the cache is dropped, so a panic unwinding through the run
//! does not lose them.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, ResultExt};
use crate::model::CacheEntry;

/// Video id to resolution, backed by a JSON file.
pub struct ResolutionCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
    dirty: bool,
}

/// What was found at the cache path
enum Stored {
    Missing,
    Parsed(BTreeMap<String, CacheEntry>),
    Malformed(serde_json::Error),
}

impl ResolutionCache {
    /// Load the cache at `path` for a run.
    ///
    /// A missing file is a cold start. A malformed file is moved aside to
    /// `<name>.corrupt` and also treated as a cold start. A file that exists
    /// but cannot be read is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match read_stored(&path)? {
            Stored::Parsed(entries) => entries,
            Stored::Missing => {
                tracing::info!("No cache at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Stored::Malformed(e) => {
                let backup = path.with_extension("corrupt");
                tracing::warn!(
                    "Cache file {:?} is malformed ({}), moving it to {:?} and starting empty",
                    path,
                    e,
                    backup
                );
                fs::rename(&path, &backup)
                    .with_context(format!("moving malformed cache to {}", backup.display()))?;
                BTreeMap::new()
            }
        };

        tracing::info!("Loaded {} cached resolutions", entries.len());
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Load the cache at `path` without touching the file.
    ///
    /// Unlike [`load`](Self::load), a malformed file is reported as an error
    /// and left where it is.
    pub fn inspect(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match read_stored(&path)? {
            Stored::Parsed(entries) => entries,
            Stored::Missing => BTreeMap::new(),
            Stored::Malformed(e) => {
                return Err(Error::Json(e).context(format!("reading cache {}", path.display())));
            }
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, video_id: &str) -> Option<&CacheEntry> {
        self.entries.get(video_id)
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.entries.contains_key(video_id)
    }

    /// Store an entry, returning the one it replaced.
    ///
    /// The resolver only ever inserts fresh ids; overwriting is reserved for
    /// manual corrections.
    pub fn put(&mut self, video_id: impl Into<String>, entry: CacheEntry) -> Option<CacheEntry> {
        self.dirty = true;
        self.entries.insert(video_id.into(), entry)
    }

    /// Record that `video_id` should never be looked up again.
    pub fn mark_unresolvable(&mut self, video_id: impl Into<String>) -> Option<CacheEntry> {
        self.put(video_id, CacheEntry::Unresolvable)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries holding a record.
    pub fn resolved_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Resolved(_)))
            .count()
    }

    /// Number of tombstones.
    pub fn unresolvable_count(&self) -> usize {
        self.len() - self.resolved_count()
    }

    /// Whether there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the whole map to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(format!("creating {}", dir.display()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path)
                .with_context(format!("creating {}", temp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &self.entries).with_context("serializing cache")?;
            writer
                .flush()
                .with_context(format!("writing {}", temp_path.display()))?;
        }
        fs::rename(&temp_path, &self.path)
            .with_context(format!("replacing {}", self.path.display()))?;

        self.dirty = false;
        tracing::debug!("Flushed {} cache entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}

fn read_stored(path: &Path) -> Result<Stored> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Stored::Missing),
        Err(e) => return Err(Error::Io(e).context(format!("opening cache {}", path.display()))),
    };
    match serde_json::from_reader(BufReader::new(file)) {
        Ok(entries) => Ok(Stored::Parsed(entries)),
        Err(e) if e.is_io() => Err(Error::Json(e).context(format!("reading cache {}", path.display()))),
        Err(e) => Ok(Stored::Malformed(e)),
    }
}

impl Drop for ResolutionCache {
    fn drop(&mut self) {
        if self.dirty
            && let Err(e) = self.flush()
        {
            tracing::error!("Failed to flush cache on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::record;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_cold_start() {
        let temp = TempDir::new().unwrap();
        let cache = ResolutionCache::load(temp.path().join("results_cache.json")).unwrap();
        assert!(cache.is_empty());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_malformed_file_is_cold_start() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results_cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = ResolutionCache::load(&path).unwrap();
        assert!(cache.is_empty());
        assert!(temp.path().join("results_cache.corrupt").exists());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        // A directory opens but fails on read
        let path = temp.path().join("results_cache.json");
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            ResolutionCache::load(&path),
            Err(Error::WithContext { .. })
        ));
        assert!(path.is_dir());
        assert!(!temp.path().join("results_cache.corrupt").exists());
    }

    #[test]
    fn test_inspect_does_not_move_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results_cache.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(ResolutionCache::inspect(&path).is_err());
        assert!(path.exists());
        assert!(!temp.path().join("results_cache.corrupt").exists());
    }

    #[test]
    fn test_inspect_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let cache = ResolutionCache::inspect(temp.path().join("none.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_flush_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results_cache.json");

        let mut cache = ResolutionCache::load(&path).unwrap();
        cache.put("vid1", CacheEntry::Resolved(record("Artist", "Track")));
        cache.mark_unresolvable("vid2");
        assert!(cache.is_dirty());
        cache.flush().unwrap();
        assert!(!cache.is_dirty());
        drop(cache);

        let reloaded = ResolutionCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.resolved_count(), 1);
        assert_eq!(reloaded.unresolvable_count(), 1);
        assert_eq!(
            reloaded.get("vid1"),
            Some(&CacheEntry::Resolved(record("Artist", "Track")))
        );
        assert_eq!(reloaded.get("vid2"), Some(&CacheEntry::Unresolvable));
    }

    #[test]
    fn test_put_overwrites_and_returns_previous() {
        let temp = TempDir::new().unwrap();
        let mut cache = ResolutionCache::load(temp.path().join("c.json")).unwrap();

        assert!(cache.put("v", CacheEntry::Resolved(record("A", "T"))).is_none());
        let previous = cache.mark_unresolvable("v");
        assert_eq!(previous, Some(CacheEntry::Resolved(record("A", "T"))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_drop_flushes_dirty_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("c.json");
        {
            let mut cache = ResolutionCache::load(&path).unwrap();
            cache.put("v", CacheEntry::Resolved(record("A", "T")));
        }
        assert_eq!(ResolutionCache::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_reads_legacy_cache_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("c.json");
        fs::write(
            &path,
            r#"{"a": ["Artist", "Track", "Album", 200, ""], "b": null, "c": ["X", "Y", "", "", "parsed"]}"#,
        )
        .unwrap();

        let cache = ResolutionCache::load(&path).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("b"), Some(&CacheEntry::Unresolvable));
        let c = cache.get("c").and_then(CacheEntry::as_record).unwrap();
        assert_eq!(c.duration_seconds, None);
    }
}
