//! Configuration structures for quire settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Editor settings
    #[serde(default)]
    pub editor: EditorSettings,

    /// Find/replace defaults
    #[serde(default)]
    pub search: SearchSettings,

    /// Language detection overrides
    #[serde(default)]
    pub languages: LanguageSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Width of a tab character in columns
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Indent with spaces instead of tabs
    #[serde(default)]
    pub indent_with_spaces: bool,

    /// Read `.editorconfig` files next to opened documents
    #[serde(default = "default_true")]
    pub use_editorconfig: bool,

    /// Strip trailing whitespace before saving
    #[serde(default)]
    pub trim_trailing_whitespace: bool,

    /// Make sure the document ends with a line break before saving
    #[serde(default)]
    pub append_final_newline: bool,

    /// Number of undo steps kept per document
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,
}

/// Find/replace defaults used when a request does not set them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub match_case: bool,

    #[serde(default)]
    pub whole_word: bool,

    #[serde(default)]
    pub regex: bool,

    /// Continue from the other end of the document when nothing is left
    #[serde(default = "default_true")]
    pub wrap_around: bool,
}

/// Language detection overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageSettings {
    /// Extension (without dot) -> language name, e.g. `h = "cpp"`
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_tab_width() -> usize {
    defaults::TAB_WIDTH
}

fn default_undo_limit() -> usize {
    defaults::UNDO_LIMIT
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::MAX_LOG_ENTRIES
}

// Default implementations
impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_width: default_tab_width(),
            indent_with_spaces: false,
            use_editorconfig: true,
            trim_trailing_whitespace: false,
            append_final_newline: false,
            undo_limit: default_undo_limit(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            match_case: false,
            whole_word: false,
            regex: false,
            wrap_around: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
