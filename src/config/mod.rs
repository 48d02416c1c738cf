//! Configuration and naming constants.
//!
//! This module provides:
//! - Naming and operational constants
//! - The `Config` struct used by the CLI and library callers
//! - Log level and format enums

mod constants;
mod types;

pub use constants::*;
pub use types::{Config, ConfigValidationError, LogFormat, LogLevel};
