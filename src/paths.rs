//! XDG-style path utilities for configuration and data directories.
//!
//! XDG Base Directory conventions are preferred over OS-specific locations
//! on every platform.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Returns the configuration directory for simchat.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/simchat` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/simchat` otherwise
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// Returns the data directory for simchat (log file).
///
/// Resolution order:
/// 1. `$XDG_DATA_HOME/simchat` if `XDG_DATA_HOME` is set
/// 2. `~/.local/share/simchat` otherwise
pub fn data_dir() -> Result<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

fn xdg_dir(var: &str, fallback: &[&str]) -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var(var)
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join("simchat"));
    }

    let mut dir = dirs::home_dir().context("Failed to determine home directory")?;
    dir.extend(fallback);
    Ok(dir.join("simchat"))
}
