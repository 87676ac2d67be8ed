//! Startup discovery of the external tools aitx depends on.
//!
//! tmux and the visual terminal emulator are mandatory; missing either is
//! fatal before the loop starts. Optional tools degrade features instead.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Result};
use tracing::info;

/// Resolved paths to the mandatory external tools.
#[derive(Debug)]
pub struct Toolchain {
    pub tmux: PathBuf,
    pub terminal: PathBuf,
}

/// Locate a binary on PATH via `which`.
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Find tmux and the configured terminal emulator, failing with one message
/// naming everything that is missing.
pub fn discover(terminal_name: &str) -> Result<Toolchain> {
    let tmux = find_tool("tmux");
    let terminal = find_tool(terminal_name);

    let mut missing = Vec::new();
    if tmux.is_none() {
        missing.push("'tmux'".to_string());
    }
    if terminal.is_none() {
        missing.push(format!(
            "'{terminal_name}' (or configure a different visual_terminal)"
        ));
    }
    match (tmux, terminal) {
        (Some(tmux), Some(terminal)) => {
            info!(tmux = %tmux.display(), terminal = %terminal.display(), "external tools found");
            Ok(Toolchain { tmux, terminal })
        }
        _ => bail!("cannot find required command(s): {}", missing.join(", ")),
    }
}
