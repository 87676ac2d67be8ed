//! AI collaborator interface.
//!
//! The orchestration core treats the AI as a black box behind the
//! [`Assistant`] trait: one call produces a command plus explanation, one
//! judges risk, one explains a topic. Any collaborator failure is terminal
//! for the current request only - the loop always continues.
//!
//! Risk policy: every ambiguous outcome (API error, empty response,
//! unparseable verdict, safety block) maps to [`RiskVerdict::Risky`] with a
//! reason. Ambiguity fails safe, never open.

mod gemini;

use anyhow::{bail, Result};
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// A generated command and its one-line explanation.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub command: String,
    pub explanation: Option<String>,
}

/// Collaborator judgement on whether a command is safe to auto-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskVerdict {
    Safe,
    Risky(String),
}

impl RiskVerdict {
    pub fn is_risky(&self) -> bool {
        matches!(self, RiskVerdict::Risky(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RiskVerdict::Safe => None,
            RiskVerdict::Risky(reason) => Some(reason),
        }
    }

    /// Parse the collaborator's raw risk answer. Expected shape is exactly
    /// `Safe` or `Risky: <reason>`; anything else is treated as risky.
    pub fn from_response(text: &str) -> RiskVerdict {
        let trimmed = text.trim();
        if trimmed == "Safe" {
            return RiskVerdict::Safe;
        }
        if let Some(reason) = trimmed.strip_prefix("Risky:") {
            return RiskVerdict::Risky(reason.trim().to_string());
        }
        RiskVerdict::Risky(format!(
            "unexpected risk assessment '{trimmed}'; treat the command as potentially risky"
        ))
    }
}

/// The AI text-generation collaborator.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Turn a natural-language request into a command suggestion.
    async fn generate(&self, request: &str) -> Result<Suggestion>;

    /// Judge whether a command is safe to auto-run. Infallible by design:
    /// failures surface as a risky verdict with the failure as reason.
    async fn assess(&self, command: &str) -> RiskVerdict;

    /// Explain a command or concept for a newcomer.
    async fn explain(&self, topic: &str) -> Result<String>;
}

/// Parse a generation response: command on the first line, optionally
/// `Explanation: ...` on the second.
pub fn parse_suggestion(text: &str) -> Result<Suggestion> {
    let mut lines = text.trim().splitn(2, '\n');
    let command = lines.next().unwrap_or("").trim().to_string();
    if command.is_empty() {
        bail!("AI response did not contain a command on the first line");
    }
    let explanation = lines
        .next()
        .map(str::trim)
        .and_then(|line| line.strip_prefix("Explanation:"))
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    Ok(Suggestion {
        command,
        explanation,
    })
}
