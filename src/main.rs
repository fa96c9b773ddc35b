use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod config;
mod handler;
mod transcript;
mod tui;
mod ui;

use api::ChatApi;
use app::App;
use config::Config;

#[derive(Parser)]
#[command(name = "assist")]
#[command(about = "Terminal chat client for the Police Assistance chatbot API")]
struct Cli {
    /// Override the API base URL from the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Send a single question and print the reply
    Ask {
        /// Your question
        question: String,
    },
    /// Upload a document for the backend to index
    Upload {
        /// Path to the document
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered diagnostics reach the log file
    let _log_guard = init_logging()?;

    let config = Config::load().unwrap_or_default();

    let base_url = cli
        .api_url
        .or_else(|| config.api_base_url.clone())
        .unwrap_or_else(|| api::DEFAULT_BASE_URL.to_string());
    let api = ChatApi::new(&base_url);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(api, &config).await,
        Commands::Ask { question } => ask(api, &question).await,
        Commands::Upload { file } => upload(api, &file).await,
    }
}

/// Diagnostics go to a file: the TUI owns the terminal, so nothing may be
/// written to stdout/stderr while it runs.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::data_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(log_dir, "assist.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

async fn run_chat(api: ChatApi, config: &Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(api, config);
    let result = run_loop(&mut app, &mut terminal).await;

    tui::restore()?;
    result
}

async fn run_loop(app: &mut App, terminal: &mut tui::Tui) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }

        app.poll_reply().await;
    }

    Ok(())
}

async fn ask(api: ChatApi, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        println!("{}", "Nothing to ask".yellow());
        return Ok(());
    }

    println!("{} {}\n", "You:".bold().cyan(), question);

    match api.send_message(question).await {
        Ok(body) => {
            if let Some(detail) = api::extract_error(&body) {
                println!("{}: {}", "Error".red(), detail);
            } else {
                let reply = api::extract_reply(&body)
                    .unwrap_or_else(|| api::NO_REPLY_FALLBACK.to_string());
                println!("{}", "Assistant:".bold().green());
                println!("{}", reply);
            }
        }
        Err(e) => {
            println!("{}: {}", "Error contacting the API".red(), e);
        }
    }

    Ok(())
}

async fn upload(api: ChatApi, file: &Path) -> Result<()> {
    println!("Uploading {}...", file.display().to_string().bold());

    match api.upload_document(file).await {
        Ok(body) => {
            println!("{}", "Upload accepted:".bold().green());
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(e) => {
            println!("{}: {}", "Upload failed".red(), e);
        }
    }

    Ok(())
}
