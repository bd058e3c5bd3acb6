use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::chat::{ChatSession, Display, SessionState, TerminalDisplay};
use crate::completion::HttpCompletionClient;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::context::Context;
use crate::ui::Style;

pub struct ChatOptions {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub retry: Option<u32>,
    pub dump_dir: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub endpoint: Option<String>,
}

/// Why a chat run ended with an error.
#[derive(Debug)]
pub enum RunError {
    /// Configuration could not be read or resolved.
    Config(anyhow::Error),
    /// The initial context file could not be loaded.
    Cache(anyhow::Error),
    /// The terminal stopped working mid-session.
    Session(anyhow::Error),
}

impl RunError {
    pub const fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Config(_) => exitcode::CONFIG,
            Self::Cache(_) => exitcode::NOINPUT,
            Self::Session(_) => exitcode::IOERR,
        }
    }

    pub const fn error(&self) -> &anyhow::Error {
        match self {
            Self::Config(e) | Self::Cache(e) | Self::Session(e) => e,
        }
    }
}

pub async fn run_chat(options: ChatOptions) -> Result<(), RunError> {
    let config = load_config(&options).map_err(RunError::Config)?;
    let mut session = build_session(&config)?;

    let mut display = TerminalDisplay::new(session.registry().completer());
    display.print_welcome();
    display.show_transcript(session.context().transcript());

    tracing::info!(
        model = %config.model,
        endpoint = %config.endpoint,
        retry = config.retry,
        "chat session started"
    );

    let outcome = session.run(&mut display).await;

    println!("{}", Style::success("Goodbye!"));
    println!(
        "{} {}",
        Style::label("usage"),
        Style::secondary(session.context().usage())
    );

    outcome.map_err(RunError::Session)
}

fn load_config(options: &ChatOptions) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;

    let resolve_options = ResolveOptions {
        api_key: options.api_key.clone(),
        model: options.model.clone(),
        retry: options.retry,
        dump_dir: options.dump_dir.clone(),
        cache_path: options.cache_path.clone(),
        endpoint: options.endpoint.clone(),
    };

    resolve_config(&resolve_options, &file_config)
}

fn build_session(config: &ResolvedConfig) -> Result<ChatSession, RunError> {
    let context = match &config.cache_path {
        Some(path) => Context::from_path(path)
            .with_context(|| format!("Cannot load cache: {}", path.display()))
            .map_err(RunError::Cache)?,
        None => {
            tracing::info!("starting with an empty context");
            Context::new()
        }
    };

    let client = HttpCompletionClient::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.timeout,
    )
    .map_err(|e| RunError::Config(e.into()))?;

    let state = SessionState::new(
        config.model.clone(),
        config.retry,
        config.dump_dir.clone(),
        config.known_models.clone(),
    );

    Ok(ChatSession::new(state, context, Box::new(client)))
}
