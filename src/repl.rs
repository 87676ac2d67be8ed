//! The interactive orchestration loop.
//!
//! Outer loop: pick a primary mode (Quick/Interactive) and an execution
//! style (Persistent/Separate) for the mode session. Inner loop: read one
//! request, generate a command, assess its risk, decide, dispatch. One
//! request is fully processed before the next is accepted.
//!
//! Ctrl+C at the request prompt is the interrupt relay trigger: in
//! persistent style with a live viewer it is forwarded into the viewer
//! pane; in every other situation it terminates aitx itself.

use std::io::Write as _;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::ai::{Assistant, RiskVerdict};
use crate::backend::SessionBackend;
use crate::clipboard::CopyTool;
use crate::dispatch::{Dispatcher, InterruptOutcome, PendingCommand};
use crate::mode::{parse_control, Control, ExecStyle, ModeSession, PrimaryMode};
use crate::windows::WindowSpawner;

/// Phrases that turn a request into an explanation lookup instead of
/// command generation.
const EXPLAIN_PREFIXES: &[&str] = &[
    "explain ",
    "what is ",
    "what's ",
    "tell me about ",
    "describe ",
];

/// One read from the prompt.
enum Input {
    Line(String),
    Interrupt,
    Eof,
}

/// Why the inner request loop ended.
#[derive(Debug, PartialEq, Eq)]
enum LoopExit {
    Back,
    Quit,
}

/// What to do with a generated command after the risk step.
enum Decision {
    Run,
    Skip,
}

/// If `input` is an explanation request, return the topic (possibly empty
/// when the user typed just the prefix).
fn explain_topic(input: &str) -> Option<&str> {
    let lower = input.to_lowercase();
    for prefix in EXPLAIN_PREFIXES {
        if lower.starts_with(prefix) {
            return Some(input[prefix.len()..].trim());
        }
    }
    None
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// The interactive shell front-end.
pub struct Repl<A, B, W, R>
where
    A: Assistant,
    B: SessionBackend,
    W: WindowSpawner,
    R: AsyncBufRead + Unpin,
{
    assistant: A,
    dispatcher: Dispatcher<B, W>,
    clipboard: CopyTool,
    lines: Lines<R>,
}

impl<A, B, W, R> Repl<A, B, W, R>
where
    A: Assistant,
    B: SessionBackend,
    W: WindowSpawner,
    R: AsyncBufRead + Unpin,
{
    pub fn new(
        assistant: A,
        dispatcher: Dispatcher<B, W>,
        clipboard: CopyTool,
        reader: R,
    ) -> Self {
        Self {
            assistant,
            dispatcher,
            clipboard,
            lines: reader.lines(),
        }
    }

    /// Run until the user quits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(mode) = self.select_primary_mode().await? else {
                return Ok(());
            };
            let Some(style) = self.select_style().await? else {
                return Ok(());
            };
            let session = ModeSession { mode, style };
            println!(
                "\n>>> Mode selected: {} with {} execution <<<",
                mode.label(),
                style.label()
            );
            match style {
                ExecStyle::Persistent => println!(
                    "Enter requests. Ctrl+C here interrupts the command running in the viewer.\n\
                     Scroll in the viewer with Ctrl+b then '['."
                ),
                ExecStyle::Separate => println!(
                    "Enter requests. Each command opens in a new window that stays open."
                ),
            }
            println!("Type 'explain <topic>' for explanations, 'back' to change modes, 'quit' to exit.");

            if self.request_loop(session).await? == LoopExit::Quit {
                return Ok(());
            }
        }
    }

    /// Read one line, racing it against a local Ctrl+C.
    async fn read_input(&mut self) -> Result<Input> {
        tokio::select! {
            line = self.lines.next_line() => Ok(match line? {
                Some(line) => Input::Line(line),
                None => Input::Eof,
            }),
            _ = tokio::signal::ctrl_c() => {
                println!();
                Ok(Input::Interrupt)
            }
        }
    }

    /// Primary mode menu. `None` means quit.
    async fn select_primary_mode(&mut self) -> Result<Option<PrimaryMode>> {
        loop {
            println!("\n>>>> Choose operating mode <<<<");
            println!(" [1] Quick mode        (risk check, auto-run safe commands)");
            println!(" [2] Interactive mode  (always ask: run / copy / cancel)");
            println!(" [3] Exit");
            prompt("\nEnter choice [1-3]: ");
            match self.read_input().await? {
                Input::Interrupt | Input::Eof => return Ok(None),
                Input::Line(line) => match line.trim() {
                    "1" => return Ok(Some(PrimaryMode::Quick)),
                    "2" => return Ok(Some(PrimaryMode::Interactive)),
                    "3" => return Ok(None),
                    other if parse_control(other) == Some(Control::Quit) => return Ok(None),
                    _ => println!("Invalid choice. Please enter 1, 2 or 3."),
                },
            }
        }
    }

    /// Execution style menu. `None` means quit.
    async fn select_style(&mut self) -> Result<Option<ExecStyle>> {
        loop {
            println!("\n>>>> Select execution style <<<<");
            println!(" [1] Persistent viewer (one window shows all command output)");
            println!(" [2] Separate window   (a new window per command, kept open)");
            prompt("\nEnter choice (1 or 2): ");
            match self.read_input().await? {
                Input::Interrupt | Input::Eof => return Ok(None),
                Input::Line(line) => match line.trim() {
                    "1" => return Ok(Some(ExecStyle::Persistent)),
                    "2" => return Ok(Some(ExecStyle::Separate)),
                    other if parse_control(other) == Some(Control::Quit) => return Ok(None),
                    _ => println!("Invalid choice. Please enter 1 or 2."),
                },
            }
        }
    }

    /// Handle requests until `back` or `quit`.
    async fn request_loop(&mut self, session: ModeSession) -> Result<LoopExit> {
        loop {
            prompt(&format!(
                "\naitx ({}/{})</> : ",
                session.mode.label(),
                session.style.label()
            ));
            let line = match self.read_input().await? {
                Input::Eof => return Ok(LoopExit::Quit),
                Input::Interrupt => {
                    match self.dispatcher.relay_interrupt(session.style).await {
                        InterruptOutcome::NotApplicable => {
                            println!("Ctrl+C detected. Exiting aitx.");
                            return Ok(LoopExit::Quit);
                        }
                        InterruptOutcome::Delivered => {
                            println!(
                                "Interrupt sent to the viewer; the command inside may take a moment to stop."
                            );
                        }
                        InterruptOutcome::Failed(reason) => {
                            println!("Failed to interrupt the viewer: {reason}");
                        }
                    }
                    continue;
                }
                Input::Line(line) => line,
            };

            let request = line.trim();
            if request.is_empty() {
                continue;
            }

            match parse_control(request) {
                Some(Control::Quit) => {
                    println!("Exiting aitx. Goodbye!");
                    return Ok(LoopExit::Quit);
                }
                Some(Control::Back) => {
                    if session.style == ExecStyle::Persistent && self.dispatcher.viewer_alive() {
                        println!(
                            "Note: the viewer session '{}' may still be open in its own window.",
                            self.dispatcher.viewer_session()
                        );
                    }
                    println!("<<< Returning to mode selection...");
                    return Ok(LoopExit::Back);
                }
                None => {}
            }

            if let Some(topic) = explain_topic(request) {
                if topic.is_empty() {
                    println!("Please specify what you want explained.");
                } else {
                    match self.assistant.explain(topic).await {
                        Ok(text) => println!("\nAI explanation:\n\n{text}"),
                        Err(e) => println!("Could not get an explanation: {e:#}"),
                    }
                }
                continue;
            }

            self.handle_request(session, request).await?;
        }
    }

    /// One full request cycle: generate, assess, decide, dispatch.
    async fn handle_request(&mut self, session: ModeSession, request: &str) -> Result<()> {
        println!("\n--- Generating command ---");
        let suggestion = match self.assistant.generate(request).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                println!("AI error: {e:#}");
                return Ok(());
            }
        };

        println!("\nAI suggests:  {}", suggestion.command);
        match &suggestion.explanation {
            Some(explanation) => println!("Explanation:  {explanation}"),
            None => println!("(no explanation provided)"),
        }

        println!("\nChecking command risk...");
        let verdict = self.assistant.assess(&suggestion.command).await;
        match &verdict {
            RiskVerdict::Safe => println!("Command assessed as safe."),
            RiskVerdict::Risky(reason) => {
                println!("!! RISKY COMMAND DETECTED");
                println!("   AI risk assessment: {reason}");
            }
        }

        let decision = match session.mode {
            PrimaryMode::Quick => {
                if verdict.is_risky() {
                    self.confirm_risky(session.style).await?
                } else {
                    println!(
                        "(Quick mode) Running safe command in {}...",
                        session.style.label()
                    );
                    Decision::Run
                }
            }
            PrimaryMode::Interactive => {
                self.interactive_action(session.style, &suggestion.command)
                    .await?
            }
        };

        match decision {
            Decision::Run => {
                let pending = PendingCommand {
                    request: request.to_string(),
                    command: suggestion.command,
                    explanation: suggestion.explanation,
                    verdict,
                };
                if let Err(e) = self.dispatcher.dispatch(&session, &pending).await {
                    println!("Command was not executed: {e:#}");
                }
            }
            Decision::Skip => debug!("command discarded without dispatch"),
        }
        Ok(())
    }

    /// y/n confirmation for a risky command in Quick mode.
    async fn confirm_risky(&mut self, style: ExecStyle) -> Result<Decision> {
        loop {
            prompt(&format!(
                "\nExecute this risky command in {}? (y/n): ",
                style.label()
            ));
            match self.read_input().await? {
                Input::Interrupt | Input::Eof => {
                    println!("Execution cancelled.");
                    return Ok(Decision::Skip);
                }
                Input::Line(line) => match line.trim().to_lowercase().as_str() {
                    "y" | "yes" => return Ok(Decision::Run),
                    "n" | "no" => {
                        println!("Execution cancelled by user.");
                        return Ok(Decision::Skip);
                    }
                    _ => println!("Invalid input. Please enter 'y' or 'n'."),
                },
            }
        }
    }

    /// run/copy/cancel decision in Interactive mode. The copy option only
    /// appears when a clipboard is actually available.
    async fn interactive_action(&mut self, style: ExecStyle, command: &str) -> Result<Decision> {
        let copy_available = self.clipboard.available();
        let mut options = format!("y=Run in {}", style.label());
        if copy_available {
            options.push_str(", c=Copy command");
        }
        options.push_str(", n=Cancel");

        loop {
            prompt(&format!("\nAction? ({options}): "));
            match self.read_input().await? {
                Input::Interrupt | Input::Eof => {
                    println!("Action cancelled.");
                    return Ok(Decision::Skip);
                }
                Input::Line(line) => match line.trim().to_lowercase().as_str() {
                    "y" | "yes" => return Ok(Decision::Run),
                    "c" | "copy" if copy_available => {
                        match self.clipboard.copy(command) {
                            Ok(()) => println!("Command copied to clipboard."),
                            Err(e) => println!("Copy failed: {e:#}"),
                        }
                        return Ok(Decision::Skip);
                    }
                    "n" | "no" | "cancel" => {
                        println!("Action cancelled by user.");
                        return Ok(Decision::Skip);
                    }
                    _ => println!("Invalid input. Please choose from ({options})."),
                },
            }
        }
    }
}
