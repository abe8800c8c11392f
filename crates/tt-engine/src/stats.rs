//! Session statistics with atomic counters.
//!
//! This module provides [`RunStats`] for tracking a watch session and
//! [`StatsSnapshot`] for point-in-time statistics views.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering for maximum performance. Statistics are for informational purposes
//! and don't require strict ordering guarantees.
//!
//! # Examples
//!
//! ```
//! use tt_engine::RunStats;
//!
//! let stats = RunStats::new();
//!
//! // Increment counters as the session progresses
//! stats.increment_detected();
//! stats.increment_processed();
//!
//! // Get a snapshot for display
//! let snapshot = stats.snapshot();
//! println!("{} events detected", snapshot.events_detected);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for a watch session.
///
/// Uses relaxed atomic ordering for maximum performance. These statistics
/// are for informational/display purposes and don't require strict ordering.
///
/// Counters only ever grow during a session; [`reset()`](Self::reset) is
/// the single exception.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Raw file events accepted from the watcher.
    events_detected: AtomicU64,
    /// Debounced changes handled by the engine.
    events_processed: AtomicU64,
    /// Test runs executed by the queue worker.
    tests_executed: AtomicU64,
    /// Runs whose result was green.
    tests_passed: AtomicU64,
    /// Runs whose result was not green.
    tests_failed: AtomicU64,
}

impl RunStats {
    /// Creates a new [`RunStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the detected-events counter.
    #[inline]
    pub fn increment_detected(&self) {
        self.events_detected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the processed-events counter.
    #[inline]
    pub fn increment_processed(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the executed-runs counter.
    #[inline]
    pub fn increment_executed(&self) {
        self.tests_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the passed-runs counter.
    #[inline]
    pub fn increment_passed(&self) {
        self.tests_passed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the failed-runs counter.
    #[inline]
    pub fn increment_failed(&self) {
        self.tests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all statistics.
    ///
    /// The snapshot is consistent in that all values are read at
    /// approximately the same time, but due to relaxed ordering,
    /// the values may not reflect a perfectly consistent state.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_detected: self.events_detected.load(Ordering::Relaxed),
            events_processed: self.events_processed.load(Ordering::Relaxed),
            tests_executed: self.tests_executed.load(Ordering::Relaxed),
            tests_passed: self.tests_passed.load(Ordering::Relaxed),
            tests_failed: self.tests_failed.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.events_detected.store(0, Ordering::Relaxed);
        self.events_processed.store(0, Ordering::Relaxed);
        self.tests_executed.store(0, Ordering::Relaxed);
        self.tests_passed.store(0, Ordering::Relaxed);
        self.tests_failed.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of session statistics.
///
/// Contains copied values from [`RunStats`] and is safe to store,
/// serialize, and send between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Raw file events accepted from the watcher.
    pub events_detected: u64,
    /// Debounced changes handled by the engine.
    pub events_processed: u64,
    /// Test runs executed by the queue worker.
    pub tests_executed: u64,
    /// Runs whose result was green.
    pub tests_passed: u64,
    /// Runs whose result was not green.
    pub tests_failed: u64,
}

impl StatsSnapshot {
    /// Share of detected events that survived debouncing, as a percentage.
    ///
    /// Returns 100.0 when nothing has been detected yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn processing_rate(&self) -> f64 {
        if self.events_detected == 0 {
            return 100.0;
        }
        (self.events_processed as f64 / self.events_detected as f64) * 100.0
    }

    /// Share of executed runs that passed, as a percentage.
    ///
    /// Returns 100.0 when nothing has been executed yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn success_rate(&self) -> f64 {
        if self.tests_executed == 0 {
            return 100.0;
        }
        (self.tests_passed as f64 / self.tests_executed as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_stats_are_zero() {
        let snap = RunStats::new().snapshot();
        assert_eq!(snap.events_detected, 0);
        assert_eq!(snap.tests_executed, 0);
    }

    #[test]
    fn test_increments_are_visible_in_snapshot() {
        let stats = RunStats::new();
        stats.increment_detected();
        stats.increment_detected();
        stats.increment_processed();
        stats.increment_executed();
        stats.increment_passed();

        let snap = stats.snapshot();
        assert_eq!(snap.events_detected, 2);
        assert_eq!(snap.events_processed, 1);
        assert_eq!(snap.tests_executed, 1);
        assert_eq!(snap.tests_passed, 1);
        assert_eq!(snap.tests_failed, 0);
    }

    #[test]
    fn test_executed_equals_passed_plus_failed_at_rest() {
        let stats = RunStats::new();
        for i in 0..10 {
            stats.increment_executed();
            if i % 3 == 0 {
                stats.increment_failed();
            } else {
                stats.increment_passed();
            }
        }
        let snap = stats.snapshot();
        assert_eq!(snap.tests_executed, snap.tests_passed + snap.tests_failed);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let stats = RunStats::new();
        stats.increment_detected();
        stats.increment_executed();
        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_rates() {
        let snap = StatsSnapshot {
            events_detected: 10,
            events_processed: 4,
            tests_executed: 4,
            tests_passed: 3,
            tests_failed: 1,
        };
        assert!((snap.processing_rate() - 40.0).abs() < f64::EPSILON);
        assert!((snap.success_rate() - 75.0).abs() < f64::EPSILON);

        let empty = StatsSnapshot::default();
        assert!((empty.processing_rate() - 100.0).abs() < f64::EPSILON);
        assert!((empty.success_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_increments() {
        let stats = Arc::new(RunStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.increment_detected();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(stats.snapshot().events_detected, 4000);
    }
}
