//! Persistent error log.
//!
//! Every message is also emitted as a `warn` event. The file is opened in
//! append mode and written line by line, so it accumulates across runs and
//! survives a crash mid-run.

use std::fs::OpenOptions;
use std::io::{LineWriter, Write};
use std::path::Path;

use crate::error::{Result, ResultExt};

/// Append-only log of entries that need attention.
pub struct ErrorLog {
    file: Option<LineWriter<std::fs::File>>,
    recorded: usize,
}

impl ErrorLog {
    /// Open (or create) the log at `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(format!("opening error log {}", path.display()))?;
        Ok(Self {
            file: Some(LineWriter::new(file)),
            recorded: 0,
        })
    }

    /// A log that only emits tracing events.
    pub fn discard() -> Self {
        Self {
            file: None,
            recorded: 0,
        }
    }

    /// Record one message.
    pub fn record(&mut self, message: &str) {
        tracing::warn!("{}", message);
        self.recorded += 1;
        if let Some(file) = self.file.as_mut()
            && let Err(e) = writeln!(file, "{}", message)
        {
            tracing::error!("Failed to write error log: {}", e);
        }
    }

    /// Messages recorded by this instance.
    pub fn recorded(&self) -> usize {
        self.recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("errors.txt");

        ErrorLog::open(&path).unwrap().record("Error: a is unavailable");
        let mut second = ErrorLog::open(&path).unwrap();
        second.record("Error: couldn't find b");

        assert_eq!(second.recorded(), 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Error: a is unavailable\nError: couldn't find b\n"
        );
    }

    #[test]
    fn test_discard_counts_only() {
        let mut log = ErrorLog::discard();
        log.record("x");
        log.record("y");
        assert_eq!(log.recorded(), 2);
    }
}
