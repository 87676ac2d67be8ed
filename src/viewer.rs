//! Persistent viewer lifecycle.
//!
//! [`PersistentViewer`] owns the liveness belief for the one long-lived
//! viewer session. The belief is advisory: the session lives in an external
//! process the user can close at any moment, so every consequential
//! operation re-verifies against the backend before trusting it. The flag
//! flips true only after a confirmed create-and-verify cycle and flips false
//! on any send failure, failed verification, or authoritative
//! target-missing answer.

use std::time::Duration;

use tracing::{info, warn};

use crate::backend::{primary_pane, BackendError, SessionBackend};
use crate::windows::WindowSpawner;

/// Fixed logical name of the viewer session. One per running aitx process,
/// not configurable at runtime.
pub const VIEWER_SESSION: &str = "aitx-viewer";

/// Bounded retry schedule for confirming the session after a launch.
/// Injectable so tests can run with zero delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // ~4 seconds total, enough to absorb tmux server startup latency.
        Self {
            attempts: 4,
            delay: Duration::from_millis(1100),
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy for tests.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Error type for viewer operations.
///
/// `SpawnFailed` and `NeverAppeared` are deliberately distinct: the first
/// means the terminal process could not start at all, the second means the
/// window opened but the session never came up (usually a terminal-emulator
/// flag incompatibility).
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("could not start the viewer terminal: {0}")]
    SpawnFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(
        "viewer terminal launched but session '{0}' never appeared; \
         check that the terminal emulator supports the -e flag"
    )]
    NeverAppeared(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The persistent viewer session and the current belief about its liveness.
pub struct PersistentViewer {
    session: String,
    pane: String,
    history_limit: u32,
    retry: RetryPolicy,
    alive: bool,
}

impl PersistentViewer {
    pub fn new(session: impl Into<String>, history_limit: u32) -> Self {
        let session = session.into();
        let pane = primary_pane(&session);
        Self {
            session,
            pane,
            history_limit,
            retry: RetryPolicy::default(),
            alive: false,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn session_name(&self) -> &str {
        &self.session
    }

    /// Current liveness belief. Cheap and possibly stale; fine for
    /// reporting, not for launch decisions.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Record that the session is known gone (explicit teardown notice).
    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Ensure a viewer window is attached to the session, launching one only
    /// when needed.
    ///
    /// Idempotent: when the session is confirmed alive this is a no-op
    /// besides the verification query, and it never opens a second window
    /// for a live session.
    pub async fn ensure_alive(
        &mut self,
        backend: &dyn SessionBackend,
        windows: &dyn WindowSpawner,
    ) -> Result<(), ViewerError> {
        if self.alive {
            if backend.session_exists(&self.session).await {
                return Ok(());
            }
            // The flag was stale; the window was closed externally.
            warn!(session = %self.session, "viewer flag was set but session is gone, relaunching");
            self.alive = false;
        }

        info!(session = %self.session, "launching persistent viewer");
        let attach = backend.attach_command(&self.session, self.history_limit);
        let title = format!("AI Viewer: {}", self.session);
        windows
            .open_viewer(&title, &attach)
            .map_err(|e| ViewerError::SpawnFailed(e.into()))?;

        for attempt in 1..=self.retry.attempts {
            if !self.retry.delay.is_zero() {
                tokio::time::sleep(self.retry.delay).await;
            }
            if backend.session_exists(&self.session).await {
                info!(session = %self.session, attempt, "viewer session confirmed");
                self.alive = true;
                return Ok(());
            }
        }

        Err(ViewerError::NeverAppeared(self.session.clone()))
    }

    /// Deliver one command line into the viewer's primary pane, relaunching
    /// the viewer first if necessary.
    ///
    /// On any send failure the liveness flag is cleared and the error is
    /// propagated; there is no retry within the same call. The next send
    /// triggers a fresh ensure-alive cycle.
    pub async fn send_command(
        &mut self,
        backend: &dyn SessionBackend,
        windows: &dyn WindowSpawner,
        command: &str,
    ) -> Result<(), ViewerError> {
        self.ensure_alive(backend, windows).await?;
        if let Err(e) = backend.send_keys(&self.pane, command).await {
            warn!(pane = %self.pane, error = %e, "send to viewer failed, marking dead");
            self.alive = false;
            return Err(e.into());
        }
        Ok(())
    }

    /// Forward a keyboard interrupt into the viewer's primary pane.
    ///
    /// Fire-and-forget: reports delivery of the signal, not termination of
    /// whatever is running inside. An authoritative target-missing answer
    /// clears the liveness flag; a timeout does not (the session may still
    /// be fine).
    pub async fn interrupt(&mut self, backend: &dyn SessionBackend) -> Result<(), BackendError> {
        match backend.send_interrupt(&self.pane).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if e.is_target_gone() {
                    warn!(pane = %self.pane, "viewer gone, cannot deliver interrupt");
                    self.alive = false;
                }
                Err(e)
            }
        }
    }
}
