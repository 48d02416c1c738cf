//! Error handling and load statistics.
//!
//! This module provides:
//! - Error type definitions for loads, pool setup and logger setup
//! - Operation identifiers (`select.<method>.<step>`) attached to load errors
//! - Thread-safe load statistics (per-step error counts, latency)

mod stats;
mod types;

// Re-export public API
pub use stats::LoadStats;
pub use types::{
    CursorError, DatabaseError, InitializationError, LoadError, LoadFailure, LoadMethod,
    LoadStep, MappingError, Operation, QueryTextError,
};
