//! Logging configuration from environment variables

use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "swap_terminal=info,lib_swap=info,lib_solana=info,warn";
const LOG_FILE_NAME: &str = "swap-terminal.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory for the daily rotated log file; no file logging when unset
    pub log_dir: Option<PathBuf>,
    /// Log file name inside `log_dir`
    pub log_file_name: &'static str,
    /// Filter directive used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON lines to the log file instead of plain text
    pub json_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_file_name: LOG_FILE_NAME,
            log_level: DEFAULT_LOG_FILTER.to_string(),
            json_file: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("SWAP_LOG_DIR").ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var("SWAP_LOG_JSON").ok(),
        )
    }

    fn from_vars(log_dir: Option<String>, rust_log: Option<String>, json: Option<String>) -> Self {
        Self {
            log_dir: log_dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from),
            log_file_name: LOG_FILE_NAME,
            log_level: rust_log
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            json_file: json.map(|v| v == "1").unwrap_or(false),
        }
    }

    /// Path of today's log file's base name, when file logging is on
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(self.log_file_name))
    }
}
