//! Diagnostic logging.
//!
//! Logs go to `<data_dir>/simchat.log` so they never interleave with the
//! interactive prompt. The filter comes from `SIMCHAT_LOG` (default `info`).

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::paths;

/// Environment variable holding the `tracing` filter directives.
pub const LOG_ENV: &str = "SIMCHAT_LOG";

const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,hyper_util=warn";

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Default log file location.
pub fn log_path() -> Result<PathBuf> {
    Ok(paths::data_dir()?.join("simchat.log"))
}

/// Installs the global subscriber writing to `path`.
///
/// Fails if the file cannot be opened or a subscriber is already installed.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))
}

/// Best-effort logging setup; a session without a log file still works.
pub fn init_default() {
    if let Err(e) = log_path().and_then(|path| init(&path)) {
        eprintln!("Logging disabled: {e:#}");
    }
}
