//! Load statistics tracking.
//!
//! Thread-safe counters for failed load steps and load latency, shared by
//! receivers that outlive a single load.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use log::info;
use strum::IntoEnumIterator;

use super::types::{LoadStep, Operation};

/// Thread-safe load statistics.
///
/// Every [`LoadStep`] has an error counter initialized to zero on creation.
/// Latency is kept in microseconds and converted for display.
pub struct LoadStats {
    errors: HashMap<LoadStep, AtomicUsize>,
    loads: AtomicU64,
    slow_loads: AtomicU64,
    total_micros: AtomicU64,
    max_micros: AtomicU64,
}

impl LoadStats {
    /// Zeroed statistics with a counter for every load step.
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for step in LoadStep::iter() {
            errors.insert(step, AtomicUsize::new(0));
        }

        LoadStats {
            errors,
            loads: AtomicU64::new(0),
            slow_loads: AtomicU64::new(0),
            total_micros: AtomicU64::new(0),
            max_micros: AtomicU64::new(0),
        }
    }

    /// Increment the error counter for the operation's step.
    pub fn increment_error(&self, operation: Operation) {
        if let Some(counter) = self.errors.get(&operation.step) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in LoadStats initialization.",
                operation.step
            );
        }
    }

    /// Records the latency of one finished load.
    pub fn record_timing(&self, elapsed: Duration, slow: bool) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.total_micros.fetch_add(micros, Ordering::Relaxed);
        self.max_micros.fetch_max(micros, Ordering::Relaxed);
        if slow {
            self.slow_loads.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get the error count for a step.
    pub fn get_error_count(&self, step: LoadStep) -> usize {
        self.errors
            .get(&step)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total error count across all steps.
    pub fn total_errors(&self) -> usize {
        LoadStep::iter().map(|s| self.get_error_count(s)).sum()
    }

    /// Number of loads timed so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of loads over the slow-query threshold.
    pub fn slow_load_count(&self) -> u64 {
        self.slow_loads.load(Ordering::Relaxed)
    }

    /// Average load latency.
    pub fn average(&self) -> Duration {
        match self.load_count() {
            0 => Duration::ZERO,
            count => Duration::from_micros(self.total_micros.load(Ordering::Relaxed) / count),
        }
    }

    /// Slowest load seen.
    pub fn max(&self) -> Duration {
        Duration::from_micros(self.max_micros.load(Ordering::Relaxed))
    }

    /// Logs a summary of load statistics.
    pub fn log_summary(&self) {
        info!(
            "Loads: {} ({} slow), avg {:.2} ms, max {:.2} ms",
            self.load_count(),
            self.slow_load_count(),
            self.average().as_secs_f64() * 1000.0,
            self.max().as_secs_f64() * 1000.0
        );
        let total = self.total_errors();
        if total == 0 {
            return;
        }
        info!("Load errors: {}", total);
        for step in LoadStep::iter() {
            let count = self.get_error_count(step);
            if count > 0 {
                info!("   {}: {}", step.as_str(), count);
            }
        }
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}
