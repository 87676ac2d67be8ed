//! Shared fakes for orchestration tests.
//!
//! The viewer lifecycle and dispatcher are tested against scripted
//! implementations of the backend and window-spawner seams, so no real
//! tmux server or terminal emulator is involved.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use aitx::ai::{Assistant, RiskVerdict, Suggestion};
use aitx::backend::{BackendError, SessionBackend};
use aitx::viewer::{PersistentViewer, RetryPolicy, VIEWER_SESSION};
use aitx::windows::WindowSpawner;

/// Error kinds a fake backend can be scripted to return.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedError {
    NoServer,
    TargetMissing,
    Timeout,
    Failed,
}

impl ScriptedError {
    pub fn to_error(self, pane: &str) -> BackendError {
        match self {
            ScriptedError::NoServer => BackendError::NoServer,
            ScriptedError::TargetMissing => BackendError::TargetMissing(pane.to_string()),
            ScriptedError::Timeout => BackendError::Timeout(Duration::from_secs(3)),
            ScriptedError::Failed => BackendError::Failed("scripted failure".to_string()),
        }
    }
}

#[derive(Default)]
pub struct BackendState {
    /// Per-call scripted answers for `session_exists`; when exhausted,
    /// `default_exists` is used.
    pub exists_responses: VecDeque<bool>,
    pub default_exists: bool,
    pub exists_queries: u32,
    /// Every (pane, text) pair delivered via send_keys.
    pub sent: Vec<(String, String)>,
    pub send_error: Option<ScriptedError>,
    /// Every pane that received an interrupt.
    pub interrupts: Vec<String>,
    pub interrupt_error: Option<ScriptedError>,
}

/// Scripted [`SessionBackend`].
#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<BackendState>,
}

impl FakeBackend {
    pub fn with_exists(responses: impl IntoIterator<Item = bool>, default_exists: bool) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.exists_responses = responses.into_iter().collect();
            state.default_exists = default_exists;
        }
        backend
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn interrupts(&self) -> Vec<String> {
        self.state.lock().unwrap().interrupts.clone()
    }

    pub fn exists_queries(&self) -> u32 {
        self.state.lock().unwrap().exists_queries
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn session_exists(&self, _name: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.exists_queries += 1;
        state
            .exists_responses
            .pop_front()
            .unwrap_or(state.default_exists)
    }

    fn attach_command(&self, name: &str, history_limit: u32) -> String {
        format!("fake-attach {name} {history_limit}")
    }

    async fn send_keys(&self, pane: &str, text: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.send_error {
            return Err(err.to_error(pane));
        }
        state.sent.push((pane.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_interrupt(&self, pane: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.interrupt_error {
            return Err(err.to_error(pane));
        }
        state.interrupts.push(pane.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct WindowsState {
    /// (title, command) for every viewer window launch.
    pub viewer_launches: Vec<(String, String)>,
    /// Command for every one-shot hold window.
    pub hold_windows: Vec<String>,
    pub fail_spawn: bool,
}

/// Scripted [`WindowSpawner`].
#[derive(Default)]
pub struct FakeWindows {
    pub state: Mutex<WindowsState>,
}

impl FakeWindows {
    pub fn failing() -> Self {
        let windows = Self::default();
        windows.state.lock().unwrap().fail_spawn = true;
        windows
    }

    pub fn viewer_launches(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().viewer_launches.clone()
    }

    pub fn hold_windows(&self) -> Vec<String> {
        self.state.lock().unwrap().hold_windows.clone()
    }
}

impl WindowSpawner for FakeWindows {
    fn open_viewer(&self, title: &str, command: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_spawn {
            anyhow::bail!("scripted spawn failure");
        }
        state
            .viewer_launches
            .push((title.to_string(), command.to_string()));
        Ok(())
    }

    fn open_hold_window(&self, command: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_spawn {
            anyhow::bail!("scripted spawn failure");
        }
        state.hold_windows.push(command.to_string());
        Ok(())
    }
}

/// Assistant that always answers with one fixed suggestion and verdict.
pub struct FakeAssistant {
    pub command: String,
    pub explanation: Option<String>,
    pub verdict: RiskVerdict,
}

impl FakeAssistant {
    pub fn safe(command: &str, explanation: &str) -> Self {
        Self {
            command: command.to_string(),
            explanation: Some(explanation.to_string()),
            verdict: RiskVerdict::Safe,
        }
    }

    pub fn risky(command: &str, reason: &str) -> Self {
        Self {
            command: command.to_string(),
            explanation: None,
            verdict: RiskVerdict::Risky(reason.to_string()),
        }
    }
}

#[async_trait]
impl Assistant for FakeAssistant {
    async fn generate(&self, _request: &str) -> anyhow::Result<Suggestion> {
        Ok(Suggestion {
            command: self.command.clone(),
            explanation: self.explanation.clone(),
        })
    }

    async fn assess(&self, _command: &str) -> RiskVerdict {
        self.verdict.clone()
    }

    async fn explain(&self, topic: &str) -> anyhow::Result<String> {
        Ok(format!("explanation of {topic}"))
    }
}

/// Viewer configured with zero-delay retries for tests.
pub fn test_viewer() -> PersistentViewer {
    PersistentViewer::new(VIEWER_SESSION, 1000).with_retry(RetryPolicy::immediate(4))
}
