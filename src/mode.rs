//! Operating modes and the control vocabulary.
//!
//! A "mode session" pairs a primary mode (how approval works) with an
//! execution style (where commands run) and lasts until the user types
//! `back` or quits. Neither choice is persisted across restarts.

/// How command approval works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryMode {
    /// Safe commands run automatically; risky ones need a y/n confirmation.
    Quick,
    /// Every command needs an explicit run/copy/cancel decision.
    Interactive,
}

impl PrimaryMode {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryMode::Quick => "Quick",
            PrimaryMode::Interactive => "Interactive",
        }
    }
}

/// Where approved commands execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStyle {
    /// One long-lived viewer window shows all command output.
    Persistent,
    /// Every command opens a fresh window that stays open afterwards.
    Separate,
}

impl ExecStyle {
    pub fn label(&self) -> &'static str {
        match self {
            ExecStyle::Persistent => "Persistent",
            ExecStyle::Separate => "Separate",
        }
    }
}

/// One user interaction epoch: chosen at mode selection, held until `back`.
#[derive(Debug, Clone, Copy)]
pub struct ModeSession {
    pub mode: PrimaryMode,
    pub style: ExecStyle,
}

/// Control words recognized at any request prompt, case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Return to mode selection.
    Back,
    /// Terminate the process.
    Quit,
}

/// Parse a control word from user input. Anything else (including empty
/// input) is not a control word.
pub fn parse_control(input: &str) -> Option<Control> {
    match input.trim().to_lowercase().as_str() {
        "quit" | "exit" => Some(Control::Quit),
        "back" => Some(Control::Back),
        _ => None,
    }
}
