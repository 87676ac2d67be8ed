//! Command dispatch.
//!
//! The dispatcher delivers one approved command to the chosen execution
//! surface: the persistent viewer pane or a fresh one-shot window. It also
//! owns the two side channels around execution - the audit history entry
//! written before every dispatch, and the interrupt relay into the viewer.

use anyhow::Result;
use tracing::{error, info};

use crate::ai::RiskVerdict;
use crate::backend::SessionBackend;
use crate::history::HistoryLog;
use crate::mode::{ExecStyle, ModeSession};
use crate::viewer::PersistentViewer;
use crate::windows::WindowSpawner;

/// One approved command on its way to execution. Lives for a single
/// request/response cycle and is discarded after dispatch or cancellation.
#[derive(Debug, Clone)]
pub struct PendingCommand {
    /// The user's original natural-language request.
    pub request: String,
    /// The literal command text to execute.
    pub command: String,
    pub explanation: Option<String>,
    pub verdict: RiskVerdict,
}

/// Outcome of an interrupt request, scoped by execution style.
#[derive(Debug)]
pub enum InterruptOutcome {
    /// Interrupt does not apply here (separate style, or viewer not
    /// believed alive); the caller should terminate the process instead.
    NotApplicable,
    /// Signal delivered to the viewer pane.
    Delivered,
    /// Delivery failed; the reason is user-facing text.
    Failed(String),
}

/// Routes approved commands to an execution surface.
pub struct Dispatcher<B: SessionBackend, W: WindowSpawner> {
    backend: B,
    windows: W,
    viewer: PersistentViewer,
    history: HistoryLog,
}

impl<B: SessionBackend, W: WindowSpawner> Dispatcher<B, W> {
    pub fn new(backend: B, windows: W, viewer: PersistentViewer, history: HistoryLog) -> Self {
        Self {
            backend,
            windows,
            viewer,
            history,
        }
    }

    /// Cheap, possibly stale liveness belief for prompts and reporting.
    pub fn viewer_alive(&self) -> bool {
        self.viewer.is_alive()
    }

    pub fn viewer_session(&self) -> &str {
        self.viewer.session_name()
    }

    /// Deliver one approved command.
    ///
    /// The history entry is always written first, regardless of what the
    /// execution surface does afterwards. A failed history write is
    /// reported but never blocks the dispatch.
    pub async fn dispatch(&mut self, session: &ModeSession, pending: &PendingCommand) -> Result<()> {
        if let Err(e) = self.history.append(
            session.mode.label(),
            session.style.label(),
            &pending.request,
            &pending.command,
        ) {
            error!(error = %e, "failed to write history entry");
            eprintln!("Warning: could not write history log: {e:#}");
        }

        match session.style {
            ExecStyle::Persistent => {
                info!(command = %pending.command, "dispatching to persistent viewer");
                self.viewer
                    .send_command(&self.backend, &self.windows, &pending.command)
                    .await?;
            }
            ExecStyle::Separate => {
                info!(command = %pending.command, "dispatching to one-shot window");
                self.windows.open_hold_window(&pending.command)?;
            }
        }
        Ok(())
    }

    /// Relay a local interrupt into the viewer pane, when it applies.
    ///
    /// Only persistent style with a live viewer belief routes the signal;
    /// everything else is the caller's cue to terminate the process. The
    /// belief may be stale - a target-gone answer from the backend clears
    /// it here.
    pub async fn relay_interrupt(&mut self, style: ExecStyle) -> InterruptOutcome {
        if style != ExecStyle::Persistent || !self.viewer.is_alive() {
            return InterruptOutcome::NotApplicable;
        }
        match self.viewer.interrupt(&self.backend).await {
            Ok(()) => InterruptOutcome::Delivered,
            Err(e) => InterruptOutcome::Failed(format!("{e}")),
        }
    }
}
