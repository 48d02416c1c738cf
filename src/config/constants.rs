//! Configuration constants.
//!
//! Naming conventions and operational defaults shared by the loader, the
//! storage layer and the CLI.

/// Column tag that excludes a field from loading.
pub const EXCLUDED_COLUMN_TAG: &str = "-";

/// Default SQLite database path for the CLI.
pub const DEFAULT_DB_PATH: &str = "./rowmap.db";

/// Loads slower than this are logged at warn level by the logging receiver.
pub const DEFAULT_SLOW_QUERY_MS: u64 = 500;

/// Prefix of every operation identifier reported to event receivers.
pub const OPERATION_PREFIX: &str = "select";
