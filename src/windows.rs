//! Visual terminal window spawning.
//!
//! Two kinds of windows get opened: the persistent viewer (a terminal
//! running the backend's create-or-attach command) and one-shot windows that
//! run a single command and stay open afterwards so the user can read the
//! output. Both are launched detached - aitx never waits on them.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::info;

/// Spawns detached terminal windows. Injectable so orchestration tests can
/// count launches instead of opening real windows.
pub trait WindowSpawner: Send + Sync {
    /// Open a titled window running `command` (used for the viewer).
    fn open_viewer(&self, title: &str, command: &str) -> Result<()>;

    /// Open a fresh window that runs `command` once and keeps itself open
    /// after the command exits.
    fn open_hold_window(&self, command: &str) -> Result<()>;
}

/// Real spawner shelling out to a terminal emulator (xfce4-terminal by
/// default). The emulator must support `-T`, `-e` and `--hold`.
pub struct VisualTerminal {
    binary: PathBuf,
}

impl VisualTerminal {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    fn spawn_detached(&self, args: &[String]) -> Result<()> {
        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| {
                format!("failed to launch terminal '{}'", self.binary.display())
            })?;
        info!(pid = child.id(), terminal = %self.binary.display(), "launched terminal window");
        Ok(())
    }
}

impl WindowSpawner for VisualTerminal {
    fn open_viewer(&self, title: &str, command: &str) -> Result<()> {
        let args = vec![
            "-T".to_string(),
            title.to_string(),
            "-e".to_string(),
            format!("bash -c \"{command}\""),
        ];
        self.spawn_detached(&args)
    }

    fn open_hold_window(&self, command: &str) -> Result<()> {
        // The command is wrapped in `sh -c '...'`, so embedded single quotes
        // must be escaped for the inner shell to see the exact original text.
        let args = vec![
            "--hold".to_string(),
            "-e".to_string(),
            format!("sh -c {}", shell_escape(command)),
        ];
        self.spawn_detached(&args)
    }
}

impl<T: WindowSpawner + ?Sized> WindowSpawner for &T {
    fn open_viewer(&self, title: &str, command: &str) -> Result<()> {
        (**self).open_viewer(title, command)
    }

    fn open_hold_window(&self, command: &str) -> Result<()> {
        (**self).open_hold_window(command)
    }
}

/// Escape a string for safe shell use.
///
/// Wraps the string in single quotes and escapes embedded single quotes
/// using the `'\''` technique (end quote, escaped quote, start quote).
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
