//! # Fibonacci Backoff
//!
//! Requeue delays for Static resources whose reconciliation failed.
//! Delays grow along the Fibonacci sequence in minutes (1m, 1m, 2m, 3m, 5m,
//! 8m) and are capped, so a persistently failing site is retried slowly
//! without being dropped.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fibonacci backoff calculator, in whole minutes.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Creates a backoff starting at `min_minutes` and capped at `max_minutes`.
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Returns the current delay and advances the sequence.
    pub fn next_backoff(&mut self) -> Duration {
        let result = Duration::from_secs(self.current_minutes * 60);

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = std::cmp::min(next_minutes, self.max_minutes);

        result
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Backoff state per resource key (`namespace/name`).
///
/// Lives in the trigger layer only; the reconcilers themselves keep no state
/// between passes.
#[derive(Debug, Default)]
pub struct BackoffRegistry {
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffRegistry {
    /// Delay before the next attempt for `key`, advancing its sequence.
    pub fn next(&self, key: &str) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.entry(key.to_string()).or_default().next_backoff()
    }

    /// Drops the failure history of `key` after a successful pass or once
    /// the Static is gone.
    pub fn forget(&self, key: &str) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
