//! Load event receivers.
//!
//! Every load reports its elapsed time once the query text is known, and every
//! failed step reports the operation, the query text and the error.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::config::{Config, DEFAULT_SLOW_QUERY_MS};
use crate::error_handling::{LoadStats, Operation};

/// Sink for load timings and failures.
///
/// Both methods default to doing nothing.
pub trait EventReceiver: Send + Sync {
    /// A load step failed.
    fn event_err(&self, _operation: Operation, _sql: &str, _err: &(dyn Error + 'static)) {}

    /// A load finished, successfully or not.
    fn timing(&self, _event: &str, _elapsed: Duration, _sql: &str) {}
}

/// Receiver that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventReceiver;

impl EventReceiver for NullEventReceiver {}

/// Receiver that logs events and keeps [`LoadStats`].
pub struct LogEventReceiver {
    slow_query_threshold: Duration,
    stats: Arc<LoadStats>,
}

impl LogEventReceiver {
    /// Receiver warning about loads at or over `slow_query_threshold`.
    pub fn new(slow_query_threshold: Duration) -> Self {
        Self {
            slow_query_threshold,
            stats: Arc::new(LoadStats::new()),
        }
    }

    /// Receiver using the configured slow-query threshold.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.slow_query_threshold())
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> Arc<LoadStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for LogEventReceiver {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SLOW_QUERY_MS))
    }
}

impl EventReceiver for LogEventReceiver {
    fn event_err(&self, operation: Operation, sql: &str, err: &(dyn Error + 'static)) {
        self.stats.increment_error(operation);
        warn!("{} failed: {} (sql: {})", operation, err, sql);
    }

    fn timing(&self, event: &str, elapsed: Duration, sql: &str) {
        let slow = elapsed >= self.slow_query_threshold;
        self.stats.record_timing(elapsed, slow);
        if slow {
            warn!(
                "{} took {:.2} ms, over the {} ms threshold (sql: {})",
                event,
                elapsed.as_secs_f64() * 1000.0,
                self.slow_query_threshold.as_millis(),
                sql
            );
        } else {
            debug!(
                "{} took {:.2} ms (sql: {})",
                event,
                elapsed.as_secs_f64() * 1000.0,
                sql
            );
        }
    }
}
