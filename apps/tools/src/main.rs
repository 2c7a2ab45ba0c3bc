use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use completion::GeminiClient;
use lang_detect::KeywordGuesser;
use server::config::load_settings;
use session_core::{InputEdit, SessionController, SessionState};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Command-line access to the code cleaner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved language of a source file.
    Detect { file: PathBuf },
    /// Send a file through the optimize prompt and print the cleaned code.
    Optimize {
        file: PathBuf,
        /// Also write the result as `optimized_code.<tag>` into this directory.
        #[arg(long)]
        save_to: Option<PathBuf>,
    },
    /// Print an explanation of a source file.
    Explain { file: PathBuf },
}

/// Loads `file` into a fresh session the way an upload would.
fn load_session(file: &Path) -> Result<SessionState> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", file.display()))?;

    let mut state = SessionState::new();
    state.apply_edit(InputEdit::uploaded(file_name, text, Utc::now()));
    Ok(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings();
    let controller = SessionController::new(
        Arc::new(GeminiClient::new(settings.gemini_config())),
        Arc::new(KeywordGuesser::new()),
    );

    match cli.command {
        Command::Detect { file } => {
            let state = load_session(&file)?;
            match controller.resolve_language(&state) {
                Some(resolution) if resolution.is_recognized() => {
                    println!("{}", resolution.as_str())
                }
                Some(resolution) => println!("{} (unrecognized guess)", resolution.as_str()),
                None => println!("unknown"),
            }
        }
        Command::Optimize { file, save_to } => {
            let mut state = load_session(&file)?;
            let code = state.pending_input().text.clone();
            if code.trim().is_empty() {
                bail!("{} is empty; nothing to optimize", file.display());
            }
            let language = controller.resolve_language(&state);
            debug!(language = ?language.as_ref().map(|l| l.as_str()), "optimizing");

            let cleaned = controller
                .optimize(&mut state, &code, language.as_ref().map(|l| l.as_str()))
                .await?;
            println!("{cleaned}");

            if let Some(dir) = save_to {
                if let Some(download) = controller.download(&state) {
                    let path = dir.join(&download.file_name);
                    fs::write(&path, download.body)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("saved {}", path.display());
                }
            }
        }
        Command::Explain { file } => {
            let mut state = load_session(&file)?;
            let code = state.pending_input().text.clone();
            if code.trim().is_empty() {
                bail!("{} is empty; nothing to explain", file.display());
            }
            let language = controller.resolve_language(&state);
            let explained = controller
                .explain(&mut state, &code, language.as_ref().map(|l| l.as_str()))
                .await?;
            println!("{}", explained.explanation);
        }
    }

    Ok(())
}
