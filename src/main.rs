use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::BufReader;

use aitx::ai::GeminiClient;
use aitx::backend::TmuxBackend;
use aitx::clipboard::CopyTool;
use aitx::config::Config;
use aitx::dispatch::Dispatcher;
use aitx::history::HistoryLog;
use aitx::repl::Repl;
use aitx::tools;
use aitx::viewer::{PersistentViewer, VIEWER_SESSION};
use aitx::windows::VisualTerminal;

#[derive(Parser)]
#[command(name = "aitx")]
#[command(about = "AI-assisted Linux terminal - natural language to shell commands")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.aitx/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;

    let api_key = config.resolve_api_key().context(
        "no Gemini API key found; set GEMINI_API_KEY or put api_key in ~/.aitx/config.toml",
    )?;

    // Mandatory external tools are fatal at startup; the clipboard is not.
    let toolchain = tools::discover(&config.visual_terminal)?;
    let clipboard = CopyTool::detect();
    if !clipboard.available() {
        println!("Note: clipboard unavailable, the copy option will not be offered.");
    }

    let assistant = GeminiClient::new(api_key, config.model.clone());
    let backend = TmuxBackend::new(toolchain.tmux);
    let windows = VisualTerminal::new(toolchain.terminal);
    let viewer = PersistentViewer::new(VIEWER_SESSION, config.history_limit);
    let history = HistoryLog::new(HistoryLog::default_path());
    let dispatcher = Dispatcher::new(backend, windows, viewer, history);

    println!("=========================================");
    println!(" aitx - AI assisted Linux terminal");
    println!("=========================================");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut repl = Repl::new(assistant, dispatcher, clipboard, stdin);
    repl.run().await
}
