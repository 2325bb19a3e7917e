//! Configuration management for quire.
//!
//! Loads and saves the preferences file (TOML) from the XDG config
//! directory. The loaded [`Config`] is an ordinary value: the application
//! root owns it and hands references to each editor session.

mod settings;
mod xdg;

pub use settings::{Config, EditorSettings, LanguageSettings, LoggingSettings, SearchSettings};
pub use xdg::{get_config_dir, get_state_dir};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default values as constants
pub mod defaults {
    pub const TAB_WIDTH: usize = 4;
    pub const UNDO_LIMIT: usize = 1000;
    pub const MIN_LOG_LEVEL: &str = "info";
    pub const MAX_LOG_ENTRIES: usize = 500;
    pub const LOG_FILE_NAME: &str = "quire.log";
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// On first run, creates config file with default values.
    /// Auto-completes missing keys with default values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`, writing defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run - create config file with default values
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let original_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::validate_content(&original_content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        // Serialize back to get normalized content
        let normalized_content = toml::to_string_pretty(&config)?;

        // If content changed, save the updated config
        if original_content != normalized_content {
            config.save_to(path)?;
        }

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Get path to config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Log file to use: the configured one or the default in the state dir.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        match &self.logging.file_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(get_state_dir()?.join(defaults::LOG_FILE_NAME)),
        }
    }

    /// Validate config content.
    pub fn validate_content(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
    }
}
