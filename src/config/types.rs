//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::config::constants::{DEFAULT_DB_PATH, DEFAULT_SLOW_QUERY_MS};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// A configuration value that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong and what is expected
    pub message: String,
}

/// Loader and CLI configuration.
///
/// Parsed from the command line by the `rowmap` binary; library callers build
/// it with struct update syntax over [`Config::default`].
///
/// # Examples
///
/// ```
/// use rowmap::Config;
///
/// let config = Config {
///     query: "SELECT count(*) FROM users".into(),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "rowmap", version, about = "Run a scalar SQL query against a SQLite database")]
pub struct Config {
    /// SQL query to run; the first column of the first row is printed
    pub query: String,

    /// Database path (SQLite file)
    #[arg(long = "db", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Loads slower than this many milliseconds are logged as warnings
    #[arg(long, default_value_t = DEFAULT_SLOW_QUERY_MS)]
    pub slow_query_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query: String::new(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            slow_query_ms: DEFAULT_SLOW_QUERY_MS,
        }
    }
}

impl Config {
    /// Checks values that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.query.trim().is_empty() {
            return Err(ConfigValidationError {
                field: "query",
                message: "must contain a SQL statement".into(),
            });
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigValidationError {
                field: "db_path",
                message: "must name a SQLite database file".into(),
            });
        }
        if self.slow_query_ms == 0 {
            return Err(ConfigValidationError {
                field: "slow_query_ms",
                message: "must be greater than 0".into(),
            });
        }
        Ok(())
    }

    /// Slow-query threshold as a `Duration`.
    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_ms)
    }
}
