//! Run output: scrobble CSV shards and the error log.
//!
//! Rows go through the [`RowSink`] trait so the run loop can be tested
//! against an in-memory sink.

mod errors;

pub use errors::ErrorLog;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};
use crate::model::OutputRow;

/// Rows per shard file unless configured otherwise
pub const DEFAULT_SHARD_SIZE: usize = 2800;

/// Destination for output rows.
pub trait RowSink {
    fn write_row(&mut self, row: &OutputRow) -> Result<()>;

    /// Flush buffered rows. Called once at the end of a run, including
    /// interrupted and failed runs.
    fn finish(&mut self) -> Result<()>;
}

/// Writes rows as headerless CSV into `part0.csv`, `part1.csv`, ...,
/// starting a new file every `shard_size` rows.
pub struct ShardedCsvWriter {
    dir: PathBuf,
    shard_size: usize,
    writer: Option<csv::Writer<File>>,
    rows_written: usize,
}

impl ShardedCsvWriter {
    /// Recreate `dir` empty and prepare to write into it.
    ///
    /// Anything already in `dir` is deleted; output always reflects a single run.
    pub fn create(dir: impl Into<PathBuf>, shard_size: usize) -> Result<Self> {
        let dir = dir.into();
        if shard_size == 0 {
            return Err(crate::error::Error::config("shard size must be positive"));
        }

        if dir.exists() {
            fs::remove_dir_all(&dir).with_context(format!("clearing {}", dir.display()))?;
        }
        fs::create_dir_all(&dir).with_context(format!("creating {}", dir.display()))?;

        Ok(Self {
            dir,
            shard_size,
            writer: None,
            rows_written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Number of shard files opened so far.
    pub fn shard_count(&self) -> usize {
        self.rows_written.div_ceil(self.shard_size)
    }

    fn shard_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("part{index}.csv"))
    }

    fn current_writer(&mut self) -> Result<&mut csv::Writer<File>> {
        if self.rows_written % self.shard_size == 0 {
            if let Some(mut previous) = self.writer.take() {
                previous.flush()?;
            }
            let path = self.shard_path(self.rows_written / self.shard_size);
            tracing::debug!("Opening shard {:?}", path);
            let writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&path)?;
            self.writer = Some(writer);
        }

        self.writer
            .as_mut()
            .ok_or_else(|| crate::error::Error::config("shard writer missing"))
    }
}

impl RowSink for ShardedCsvWriter {
    fn write_row(&mut self, row: &OutputRow) -> Result<()> {
        self.current_writer()?.write_record(row.fields())?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::output_row;
    use tempfile::TempDir;

    #[test]
    fn test_create_clears_existing_output() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stale.csv"), "old").unwrap();

        let writer = ShardedCsvWriter::create(&dir, 10).unwrap();

        assert!(writer.dir().exists());
        assert!(!dir.join("stale.csv").exists());
    }

    #[test]
    fn test_rows_are_headerless_csv() {
        let temp = TempDir::new().unwrap();
        let mut writer = ShardedCsvWriter::create(temp.path().join("out"), 10).unwrap();

        writer.write_row(&output_row("A, B", "Track")).unwrap();
        writer.finish().unwrap();

        let contents = fs::read_to_string(temp.path().join("out/part0.csv")).unwrap();
        assert_eq!(
            contents,
            "\"A, B\",Album,Track,2024-03-01T12:00:00Z,,00:03:20\n"
        );
    }

    #[test]
    fn test_shard_boundaries() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out");
        let mut writer = ShardedCsvWriter::create(&dir, 3).unwrap();

        for i in 0..7 {
            writer.write_row(&output_row("A", &format!("T{i}"))).unwrap();
        }
        writer.finish().unwrap();

        assert_eq!(writer.rows_written(), 7);
        assert_eq!(writer.shard_count(), 3);
        let lines = |n: usize| {
            fs::read_to_string(dir.join(format!("part{n}.csv")))
                .unwrap()
                .lines()
                .count()
        };
        assert_eq!(lines(0), 3);
        assert_eq!(lines(1), 3);
        assert_eq!(lines(2), 1);
        assert!(!dir.join("part3.csv").exists());
    }

    #[test]
    fn test_exact_multiple_opens_no_empty_shard() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out");
        let mut writer = ShardedCsvWriter::create(&dir, DEFAULT_SHARD_SIZE).unwrap();

        for _ in 0..DEFAULT_SHARD_SIZE {
            writer.write_row(&output_row("A", "T")).unwrap();
        }
        writer.finish().unwrap();

        assert_eq!(writer.shard_count(), 1);
        assert!(dir.join("part0.csv").exists());
        assert!(!dir.join("part1.csv").exists());

        // Row 2801 starts the second shard
        let mut writer = ShardedCsvWriter::create(&dir, DEFAULT_SHARD_SIZE).unwrap();
        for _ in 0..=DEFAULT_SHARD_SIZE {
            writer.write_row(&output_row("A", "T")).unwrap();
        }
        writer.finish().unwrap();
        assert_eq!(writer.shard_count(), 2);
        assert_eq!(fs::read_to_string(dir.join("part1.csv")).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_zero_shard_size_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(ShardedCsvWriter::create(temp.path().join("out"), 0).is_err());
    }
}
