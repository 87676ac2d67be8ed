//! Session backend abstraction.
//!
//! The persistent viewer lives inside an external terminal multiplexer.
//! Everything the rest of the crate needs from it fits behind the narrow
//! [`SessionBackend`] trait: check whether a named session exists, build the
//! command a viewer window runs to create-or-attach it, type text into a
//! pane, and deliver an interrupt signal to a pane.
//!
//! Keeping the trait this small lets the orchestration logic (viewer
//! lifecycle, dispatch, interrupt relay) be tested against a fake backend
//! without spawning real processes.

mod tmux;

use std::time::Duration;

use async_trait::async_trait;

pub use tmux::TmuxBackend;

/// Error type for backend operations.
///
/// The caller cares about the failure class: a timeout is ambiguous (the
/// session may still be fine), while a missing target is an authoritative
/// signal that the session is gone and must be recreated.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend did not answer within the operation's time budget.
    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    /// The backend server itself is not running.
    #[error("no backend server is running")]
    NoServer,

    /// The addressed session or pane does not exist.
    #[error("session or pane '{0}' not found")]
    TargetMissing(String),

    /// The backend ran but reported an error we do not classify further.
    #[error("backend command failed: {0}")]
    Failed(String),

    /// The backend binary could not be invoked at all.
    #[error("failed to invoke backend: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// True when the error proves the target session/pane no longer exists,
    /// as opposed to an ambiguous failure of this one call.
    pub fn is_target_gone(&self) -> bool {
        matches!(self, BackendError::NoServer | BackendError::TargetMissing(_))
    }
}

/// Address of a session's primary pane (first window, first pane).
pub fn primary_pane(session: &str) -> String {
    format!("{session}:0.0")
}

/// Narrow interface to the external session multiplexer.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Check whether a session with the given name exists.
    ///
    /// Must be bounded by a short timeout; a timeout or any query failure is
    /// reported as "does not exist" so the caller fails toward re-creation
    /// rather than false confidence.
    async fn session_exists(&self, name: &str) -> bool;

    /// The shell command a viewer window runs to create-or-attach the named
    /// session. Idempotent: attaching to an existing session must not error.
    /// Applies the scrollback history limit and disables the alternate
    /// screen on the primary window so full-screen programs don't eat the
    /// scrollback.
    fn attach_command(&self, name: &str, history_limit: u32) -> String;

    /// Deliver `text` to the addressed pane byte-for-byte, followed by an
    /// explicit submit keystroke.
    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), BackendError>;

    /// Deliver a keyboard-interrupt to the addressed pane. No submit
    /// keystroke is appended.
    async fn send_interrupt(&self, pane: &str) -> Result<(), BackendError>;
}

#[async_trait]
impl<T: SessionBackend + ?Sized> SessionBackend for &T {
    async fn session_exists(&self, name: &str) -> bool {
        (**self).session_exists(name).await
    }

    fn attach_command(&self, name: &str, history_limit: u32) -> String {
        (**self).attach_command(name, history_limit)
    }

    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), BackendError> {
        (**self).send_keys(pane, text).await
    }

    async fn send_interrupt(&self, pane: &str) -> Result<(), BackendError> {
        (**self).send_interrupt(pane).await
    }
}
