//! JSONL audit log writer with daily file rotation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::warn;

use super::{AuditEntry, AuditLogger};
use crate::{AppError, Result};

struct OpenLog {
    date: NaiveDate,
    writer: BufWriter<File>,
}

/// Appends one JSON object per line to
/// `<log_dir>/governance-YYYY-MM-DD.jsonl`, switching files when the UTC
/// date of the entry changes.
pub struct JsonlAuditWriter {
    log_dir: PathBuf,
    current: Mutex<Option<OpenLog>>,
}

impl JsonlAuditWriter {
    /// Construct a writer that stores logs in `log_dir`, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be created.
    pub fn new(log_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&log_dir).map_err(|e| {
            AppError::Io(format!(
                "failed to create audit log directory {}: {e}",
                log_dir.display()
            ))
        })?;
        Ok(Self {
            log_dir,
            current: Mutex::new(None),
        })
    }

    /// File receiving entries dated `date`.
    #[must_use]
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        log_path(&self.log_dir, date)
    }
}

fn log_path(log_dir: &Path, date: NaiveDate) -> PathBuf {
    log_dir.join(format!("governance-{date}.jsonl"))
}

fn open_log(log_dir: &Path, date: NaiveDate) -> Result<BufWriter<File>> {
    let path = log_path(log_dir, date);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map(BufWriter::new)
        .map_err(|e| AppError::Io(format!("failed to open audit log {}: {e}", path.display())))
}

impl AuditLogger for JsonlAuditWriter {
    fn log_entry(&self, entry: AuditEntry) -> Result<()> {
        let date = entry.timestamp.date_naive();
        let line = serde_json::to_string(&entry)
            .map_err(|e| AppError::Io(format!("failed to serialize audit entry: {e}")))?;

        let mut current = self
            .current
            .lock()
            .map_err(|_| AppError::Io("audit writer mutex poisoned".into()))?;

        if current.as_ref().is_none_or(|log| log.date != date) {
            *current = Some(OpenLog {
                date,
                writer: open_log(&self.log_dir, date)?,
            });
        }

        let Some(log) = current.as_mut() else {
            return Ok(());
        };
        writeln!(log.writer, "{line}")
            .and_then(|()| log.writer.flush())
            .map_err(|e| {
                warn!(error = %e, "failed to write audit log entry");
                AppError::Io(format!("audit write failed: {e}"))
            })?;
        Ok(())
    }
}
