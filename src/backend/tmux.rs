//! tmux implementation of the session backend.
//!
//! Every call shells out to the `tmux` binary via `tokio::process` and is
//! wrapped in an explicit timeout: a hung tmux server must never hang the
//! orchestrator. stderr output is classified into the [`BackendError`]
//! variants the callers branch on.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{BackendError, SessionBackend};

/// Default bound on existence queries. Short: has-session answers instantly
/// when the server is healthy.
const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on send-keys and interrupt delivery.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// [`SessionBackend`] backed by the tmux binary.
pub struct TmuxBackend {
    tmux: PathBuf,
    query_timeout: Duration,
    send_timeout: Duration,
}

impl TmuxBackend {
    pub fn new(tmux: PathBuf) -> Self {
        Self {
            tmux,
            query_timeout: QUERY_TIMEOUT,
            send_timeout: SEND_TIMEOUT,
        }
    }

    /// Run one tmux invocation, bounded by `limit`.
    async fn run(
        &self,
        args: &[&str],
        limit: Duration,
        pane: &str,
    ) -> Result<(), BackendError> {
        let mut cmd = Command::new(&self.tmux);
        cmd.args(args).stdin(Stdio::null());

        let output = match tokio::time::timeout(limit, cmd.output()).await {
            Err(_) => return Err(BackendError::Timeout(limit)),
            Ok(Err(e)) => return Err(BackendError::Io(e)),
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_stderr(&stderr, pane))
    }
}

/// Map tmux's stderr messages onto the error taxonomy.
///
/// tmux wording varies across versions ("session not found" vs "can't find
/// session"), so this matches the stable substrings.
fn classify_stderr(stderr: &str, pane: &str) -> BackendError {
    let lower = stderr.trim().to_lowercase();
    if lower.contains("no server running") {
        BackendError::NoServer
    } else if lower.contains("session not found")
        || lower.contains("can't find session")
        || lower.contains("pane not found")
        || lower.contains("can't find pane")
        || lower.contains("can't find window")
    {
        BackendError::TargetMissing(pane.to_string())
    } else {
        BackendError::Failed(stderr.trim().to_string())
    }
}

#[async_trait]
impl SessionBackend for TmuxBackend {
    async fn session_exists(&self, name: &str) -> bool {
        match self
            .run(&["has-session", "-t", name], self.query_timeout, name)
            .await
        {
            Ok(()) => true,
            Err(BackendError::Timeout(limit)) => {
                warn!(session = name, ?limit, "timeout checking tmux session, assuming absent");
                false
            }
            Err(e) => {
                debug!(session = name, error = %e, "tmux session check failed");
                false
            }
        }
    }

    fn attach_command(&self, name: &str, history_limit: u32) -> String {
        // One tmux invocation, three chained commands. The semicolons are
        // escaped because the whole string is handed to `bash -c "..."`
        // inside the terminal emulator; tmux must see them, not bash.
        format!(
            "{tmux} new-session -A -s {name} \\; \
             set-option -t {name} history-limit {limit} \\; \
             set-window-option -t {name}:0 alternate-screen off",
            tmux = self.tmux.display(),
            name = name,
            limit = history_limit,
        )
    }

    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), BackendError> {
        // `-l` sends the text literally, so quoting metacharacters inside
        // the command arrive byte-for-byte. The submit keystroke goes in a
        // second call because key names and literal text cannot mix.
        self.run(
            &["send-keys", "-t", pane, "-l", "--", text],
            self.send_timeout,
            pane,
        )
        .await?;
        self.run(&["send-keys", "-t", pane, "C-m"], self.send_timeout, pane)
            .await
    }

    async fn send_interrupt(&self, pane: &str) -> Result<(), BackendError> {
        self.run(&["send-keys", "-t", pane, "C-c"], self.query_timeout, pane)
            .await
    }
}
