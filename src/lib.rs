//! aitx - AI-assisted Linux terminal
//!
//! aitx turns natural-language requests into shell commands via an AI
//! collaborator and executes them in external terminal windows the user can
//! watch. Commands either stream into one long-lived tmux "viewer" session
//! or each open a fresh one-shot window that stays open after the command
//! finishes.
//!
//! The interesting part is not the AI call but the session lifecycle: the
//! viewer window is an external process aitx does not own, so it has to be
//! launched on demand, re-verified before every send, rebuilt when the user
//! closes it, and reached with interrupt signals across process boundaries.

pub mod ai;
pub mod backend;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod history;
pub mod mode;
pub mod repl;
pub mod tools;
pub mod viewer;
pub mod windows;
