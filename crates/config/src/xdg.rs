//! XDG Base Directory support for quire.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "quire";

/// Get the configuration directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME/quire` or `~/.config/quire`.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine config directory")
}

/// Get the state directory for logs.
///
/// Returns `$XDG_STATE_HOME/quire`, falling back to the cache directory
/// on platforms without a state directory.
pub fn get_state_dir() -> Result<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine state directory")
}
