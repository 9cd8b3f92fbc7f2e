//! journal.rs — append-only CSV log of scored submissions.
//!
//! One row per journaled verdict: `date,dominant_emotion[,category]`.
//! Rows are never mutated or deleted here; retention is managed externally.
//! Appends go through a process-local mutex — the documented single-writer
//! primitive for this deployment; multi-process setups need their own lock
//! in front of the file.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use metrics::counter;
use tracing::warn;

use crate::error::ClassifyError;

pub const DEFAULT_JOURNAL_PATH: &str = "journal.csv";
pub const ENV_JOURNAL_PATH: &str = "JOURNAL_PATH";

/// One parsed journal row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub date: NaiveDate,
    pub emotion: String,
    pub category: Option<String>,
}

/// Append-only CSV journal with mutex-serialized writers.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path from `JOURNAL_PATH` or the default next to the working dir.
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_JOURNAL_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_JOURNAL_PATH));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row dated today (UTC).
    pub fn append_today(&self, emotion: &str, category: Option<&str>) -> Result<(), ClassifyError> {
        self.append(Utc::now().date_naive(), emotion, category)
    }

    /// Append one row. Fields are sanitized so a stray comma or newline in a
    /// category name cannot corrupt the row format.
    pub fn append(
        &self,
        date: NaiveDate,
        emotion: &str,
        category: Option<&str>,
    ) -> Result<(), ClassifyError> {
        let mut line = format!("{},{}", date.format("%Y-%m-%d"), sanitize_field(emotion));
        if let Some(cat) = category {
            line.push(',');
            line.push_str(&sanitize_field(cat));
        }
        line.push('\n');

        let guard = self.write_lock.lock().expect("journal mutex poisoned");
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        drop(guard);

        result.map_err(|e| {
            counter!("journal_append_errors_total").increment(1);
            ClassifyError::collaborator("journal", e)
        })
    }

    /// Read all rows. Malformed rows are skipped with a warning — a corrupted
    /// line must not take the summary endpoint down. A missing file reads as
    /// zero rows.
    pub fn read_rows(&self) -> Result<Vec<LogRow>, ClassifyError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ClassifyError::collaborator("journal", e)),
        };

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| ClassifyError::collaborator("journal", e))?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(&line) {
                Some(row) => rows.push(row),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, path = %self.path.display(), "journal rows skipped as malformed");
        }
        Ok(rows)
    }
}

fn sanitize_field(s: &str) -> String {
    s.replace([',', '\n', '\r'], " ").trim().to_string()
}

fn parse_row(line: &str) -> Option<LogRow> {
    let mut parts = line.splitn(3, ',');
    let date = NaiveDate::parse_from_str(parts.next()?.trim(), "%Y-%m-%d").ok()?;
    let emotion = parts.next()?.trim();
    if emotion.is_empty() {
        return None;
    }
    let category = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some(LogRow {
        date,
        emotion: emotion.to_string(),
        category,
    })
}
