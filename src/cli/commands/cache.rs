//! Resolution cache commands.

use std::path::Path;

use crate::cache::ResolutionCache;
use crate::model::{CacheEntry, format_duration};

/// Print cache totals
pub fn cmd_cache_stats(path: &Path) -> anyhow::Result<()> {
    let cache = ResolutionCache::inspect(path)?;
    println!("Cache:        {}", path.display());
    println!("Entries:      {}", cache.len());
    println!("Resolved:     {}", cache.resolved_count());
    println!("Unresolvable: {}", cache.unresolvable_count());
    Ok(())
}

/// Print one cached entry
pub fn cmd_cache_show(path: &Path, video_id: &str) -> anyhow::Result<()> {
    let cache = ResolutionCache::inspect(path)?;
    match cache.get(video_id) {
        Some(CacheEntry::Resolved(record)) => {
            println!("Artist:     {}", record.artist);
            println!("Track:      {}", record.track);
            if !record.album.is_empty() {
                println!("Album:      {}", record.album);
            }
            let duration = format_duration(record.duration_seconds);
            println!(
                "Duration:   {}",
                if duration.is_empty() { "unknown" } else { duration.as_str() }
            );
            println!("Confidence: {:?}", record.confidence);
        }
        Some(CacheEntry::Unresolvable) => println!("{} is marked unresolvable", video_id),
        None => println!("{} is not cached", video_id),
    }
    Ok(())
}

/// Tombstone video ids so future runs skip them
pub fn cmd_cache_mark(path: &Path, video_ids: &[String]) -> anyhow::Result<()> {
    let mut cache = ResolutionCache::load(path)?;
    for id in video_ids {
        match cache.mark_unresolvable(id.clone()) {
            Some(CacheEntry::Resolved(previous)) => println!(
                "{}: replaced {} - {} with a tombstone",
                id, previous.artist, previous.track
            ),
            Some(CacheEntry::Unresolvable) => println!("{}: already unresolvable", id),
            None => println!("{}: marked unresolvable", id),
        }
    }
    cache.flush()?;
    Ok(())
}
