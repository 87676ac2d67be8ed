//! Optional copy-to-clipboard support.
//!
//! Clipboard access fails on headless setups; when it does, the copy option
//! simply is not offered. Never mandatory.

use anyhow::{Context, Result};
use tracing::debug;

/// Clipboard handle that may be absent.
pub struct CopyTool {
    inner: Option<arboard::Clipboard>,
}

impl CopyTool {
    /// Probe the system clipboard.
    pub fn detect() -> Self {
        match arboard::Clipboard::new() {
            Ok(clipboard) => Self {
                inner: Some(clipboard),
            },
            Err(e) => {
                debug!(error = %e, "clipboard unavailable, copy option disabled");
                Self { inner: None }
            }
        }
    }

    /// An always-absent clipboard, for tests and headless use.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn available(&self) -> bool {
        self.inner.is_some()
    }

    /// Copy the exact command text.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        let clipboard = self
            .inner
            .as_mut()
            .context("clipboard is not available")?;
        clipboard
            .set_text(text.to_string())
            .context("failed to copy to clipboard")
    }
}
