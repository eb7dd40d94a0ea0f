//! Diagnostic log of an oracle session
//!
//! Every request sent and every response received is appended to a JSON-lines
//! file together with a timestamp:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.123Z","direction":"request","message":{...}}
//! {"timestamp":"2024-05-01T12:00:00.456Z","direction":"response","message":{...}}
//! ```
//!
//! The log is a side channel; write failures are logged and otherwise ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Distinguishes reports written by one process in the same millisecond
static REPORT_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugReportEntry {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub message: Value,
}

/// Append-only JSON-lines log, flushed when dropped
pub struct BugReport {
    path: PathBuf,
    writer: BufWriter<File>,
    entries: u64,
}

impl BugReport {
    /// Create a new report file inside `dir`, creating the directory if needed
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!(
            "oracle-{}-{}-{}.jsonl",
            Utc::now().format("%Y%m%dT%H%M%S%3f"),
            std::process::id(),
            REPORT_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let path = dir.join(name);
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn record(&mut self, direction: Direction, message: &Value) {
        let entry = BugReportEntry {
            timestamp: Utc::now(),
            direction,
            message: message.clone(),
        };
        if let Err(e) = self.write_entry(&entry) {
            warn!(path = %self.path.display(), error = %e, "Failed to write bug report entry");
        }
    }

    fn write_entry(&mut self, entry: &BugReportEntry) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")?;
        self.entries += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for BugReport {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read back every entry of a report
pub fn read_entries(path: &Path) -> io::Result<Vec<BugReportEntry>> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(io::Error::from))
        .collect()
}
