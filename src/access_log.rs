// src/access_log.rs

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const RECORD_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";
const RECORD_EXT: &str = "log";
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Per-request access records, one file per second, pruned by age.
///
/// Nothing here can fail from the caller's point of view: every error is
/// dropped after a debug trace.
#[derive(Debug, Clone)]
pub struct LogRotator {
    dir: PathBuf,
    // None when the window is too large to represent: nothing expires
    retention: Option<Duration>,
}

impl LogRotator {
    pub fn new(dir: impl Into<PathBuf>, retention_hours: u32) -> Self {
        Self {
            dir: dir.into(),
            retention: Duration::try_hours(i64::from(retention_hours)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Prune expired records, then append `message` to the current second's record.
    pub fn record(&self, message: &str) {
        self.record_at(Utc::now(), message);
    }

    pub fn record_at(&self, now: DateTime<Utc>, message: &str) {
        if let Err(e) = self.try_record(now, message) {
            debug!("access log write skipped: {e}");
        }
    }

    fn try_record(&self, now: DateTime<Utc>, message: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.prune(now);

        let line: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(record_name(now)))?;
        writeln!(file, "{line}")
    }

    /// Delete records older than the retention window; unparseable names stay.
    fn prune(&self, now: DateTime<Utc>) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        // A window reaching past the earliest representable time expires nothing
        let Some(cutoff) = self
            .retention
            .and_then(|window| now.checked_sub_signed(window))
        else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(stamp) = parse_record_name(&path) else {
                continue;
            };
            if stamp < cutoff {
                if let Err(e) = fs::remove_file(&path) {
                    debug!("could not prune {}: {e}", path.display());
                }
            }
        }
    }
}

fn record_name(at: DateTime<Utc>) -> String {
    format!("{}.{RECORD_EXT}", at.format(RECORD_FORMAT))
}

pub(crate) fn parse_record_name(path: &Path) -> Option<DateTime<Utc>> {
    if path.extension()? != RECORD_EXT {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    NaiveDateTime::parse_from_str(stem, RECORD_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
