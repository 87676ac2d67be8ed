//! Append-only command history log.
//!
//! One line per dispatched command, written before execution, never mutated.
//! Single quotes inside the request/command are escaped so every record
//! stays a single visually-parseable line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Audit log for dispatched commands.
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.aitx/history.log`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".aitx")
            .join("history.log")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. `mode` is the primary mode label ("Quick",
    /// "Interactive"), `style` the execution style label ("Persistent",
    /// "Separate").
    pub fn append(&self, mode: &str, style: &str, request: &str, command: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open history log {}", self.path.display()))?;

        let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(
            file,
            "[{ts}] Mode: {mode}/{style}, Request: '{}', Running: '{}'",
            escape_quotes(request),
            escape_quotes(command),
        )
        .context("failed to write history entry")?;
        Ok(())
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\'', "\\'")
}
