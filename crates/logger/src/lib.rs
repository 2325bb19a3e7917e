//! Logging infrastructure for quire.
//!
//! A process-wide logger with optional file output and an in-memory
//! ring of recent entries. Messages logged before [`init`] are dropped.

use chrono::Local;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Timestamp in HH:MM:SS format
    pub timestamp: String,
    /// Message level
    pub level: LogLevel,
    /// Message text
    pub message: String,
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert log level to string
    pub fn to_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Global logger state
#[derive(Debug)]
struct Logger {
    /// Most recent entries
    entries: VecDeque<LogEntry>,
    /// Maximum number of entries in memory
    max_entries: usize,
    /// Minimum log level to record
    min_level: LogLevel,
    /// Log file path, if logging to disk
    file_path: Option<PathBuf>,
}

impl Logger {
    fn new(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) -> Self {
        if let Some(path) = &file_path {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }

            // Clear log file on startup
            if let Ok(mut file) = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
            {
                let _ = writeln!(file, "=== quire log start ===");
            }
        }

        Self {
            entries: VecDeque::new(),
            max_entries,
            min_level,
            file_path,
        }
    }

    fn add_entry(&mut self, level: LogLevel, message: String) {
        if level < self.min_level {
            return;
        }

        let timestamp = Local::now().format("%H:%M:%S").to_string();

        // Write to file (create if deleted)
        if let Some(path) = &self.file_path {
            if let Ok(mut file) = OpenOptions::new().append(true).create(true).open(path) {
                let _ = writeln!(file, "[{}] {}: {}", timestamp, level.to_str(), message);
            }
        }

        self.entries.push_back(LogEntry {
            timestamp,
            level,
            message,
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

/// Global logger instance that persists for the application lifetime.
static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

fn with_logger(f: impl FnOnce(&mut Logger)) {
    if let Some(logger) = LOGGER.get() {
        if let Ok(mut logger) = logger.lock() {
            f(&mut logger);
        }
    }
}

/// Initialize the global logger
///
/// Should be called once at startup. Subsequent calls are ignored.
///
/// # Arguments
///
/// * `file_path` - Path to the log file, or `None` to keep entries in memory only
/// * `max_entries` - Maximum number of log entries to keep in memory
/// * `min_level` - Minimum log level to record (Debug, Info, Warn, Error)
pub fn init(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) {
    LOGGER.get_or_init(|| Mutex::new(Logger::new(file_path, max_entries, min_level)));
}

/// Check whether [`init`] has run
pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

/// Set minimum log level dynamically
pub fn set_min_level(level: LogLevel) {
    with_logger(|logger| logger.min_level = level);
}

/// Log a debug message
pub fn debug(message: impl Into<String>) {
    with_logger(|logger| logger.add_entry(LogLevel::Debug, message.into()));
}

/// Log an informational message
pub fn info(message: impl Into<String>) {
    with_logger(|logger| logger.add_entry(LogLevel::Info, message.into()));
}

/// Log a warning message
pub fn warn(message: impl Into<String>) {
    with_logger(|logger| logger.add_entry(LogLevel::Warn, message.into()));
}

/// Log an error message
pub fn error(message: impl Into<String>) {
    with_logger(|logger| logger.add_entry(LogLevel::Error, message.into()));
}

/// Get all log entries currently stored in memory
pub fn entries() -> Vec<LogEntry> {
    LOGGER
        .get()
        .and_then(|logger| logger.lock().ok().map(|l| l.entries.iter().cloned().collect()))
        .unwrap_or_default()
}
