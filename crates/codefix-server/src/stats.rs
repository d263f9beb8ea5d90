//! Request counters reported by the health endpoint

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Statistics tracked by the server since startup.
#[derive(Debug)]
pub struct ServerStats {
    /// Correction cycles that completed and were recorded
    pub cycles: AtomicU64,
    /// Completed cycles whose corrected code failed to run cleanly
    pub code_failures: AtomicU64,
    /// Cycles aborted because the history could not be written
    pub history_errors: AtomicU64,
    started: Instant,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            code_failures: AtomicU64::new(0),
            history_errors: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_cycle(&self, code_failed: bool) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        if code_failed {
            self.code_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_history_error(&self) {
        self.history_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
