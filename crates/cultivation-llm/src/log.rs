//! Rolling daily log of LLM calls (§4.5 "Logging").
//!
//! Grounded in `original_source/src/run/log.py`'s `Logger`: one file per
//! calendar day named `YYYYMMDD.log`, a machine-readable summary line per
//! call (model, prompt/response length, duration) followed by the raw
//! prompt and response text, and startup cleanup of files older than seven
//! days.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, Utc};

const RETENTION_DAYS: i64 = 7;

/// Appends LLM call records to a rolling, date-named log file.
pub struct CallLog {
    dir: PathBuf,
}

impl CallLog {
    /// Open (creating if needed) the log directory, pruning any `.log`
    /// files whose date suffix is more than seven days old.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        prune_old_logs(&dir);
        Ok(Self { dir })
    }

    /// Append a record of one LLM call to today's log file.
    ///
    /// Failures to write are logged via `tracing` rather than propagated --
    /// a logging failure must never fail the decision it is recording.
    pub fn record(&self, model: &str, prompt: &str, response: &str, duration: Duration) {
        let today = Utc::now().format("%Y%m%d");
        let path = self.dir.join(format!("{today}.log"));

        let summary = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "model": model,
            "prompt_length": prompt.len(),
            "response_length": response.len(),
            "duration_ms": duration.as_millis(),
        });

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
            tracing::warn!(path = %path.display(), "failed to open LLM call log");
            return;
        };

        let _ = writeln!(file, "LLM_CALL: {summary}");
        let _ = writeln!(file, "PROMPT:\n{prompt}");
        let _ = writeln!(file, "RESPONSE:\n{response}");
    }
}

fn prune_old_logs(dir: &Path) {
    let cutoff = Utc::now().date_naive() - chrono::Duration::days(RETENTION_DAYS);
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(file_date) = NaiveDate::parse_from_str(stem, "%Y%m%d") else {
            continue;
        };
        if file_date < cutoff {
            let _ = std::fs::remove_file(&path);
        }
    }
}
