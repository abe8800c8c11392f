//! Display boundary between the engine and its frontends.

use parking_lot::Mutex;

use tt_runner::TestResult;
use tt_watcher::ChangedPath;

use crate::stats::StatsSnapshot;

/// Receives engine output for presentation.
///
/// The engine never prints; everything a user sees flows through a sink.
/// The CLI installs a console implementation, the engine tests a
/// [`CollectingSink`], and [`TracingSink`] gives headless embedders
/// structured log output for free.
///
/// Implementations must be cheap and non-blocking; they are called from
/// the engine loop and the queue worker.
pub trait ResultSink: Send + Sync + 'static {
    /// A debounced change was accepted for handling.
    fn on_change(&self, change: &ChangedPath);

    /// A test run finished, successfully or not.
    fn on_result(&self, result: &TestResult);

    /// A statistics snapshot, emitted at least once at shutdown.
    fn on_stats(&self, stats: &StatsSnapshot);
}

impl<S: ResultSink + ?Sized> ResultSink for std::sync::Arc<S> {
    fn on_change(&self, change: &ChangedPath) {
        (**self).on_change(change);
    }

    fn on_result(&self, result: &TestResult) {
        (**self).on_result(result);
    }

    fn on_stats(&self, stats: &StatsSnapshot) {
        (**self).on_stats(stats);
    }
}

/// Sink that emits everything as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn on_change(&self, change: &ChangedPath) {
        tracing::info!(change = %change.describe(), "Change accepted");
    }

    fn on_result(&self, result: &TestResult) {
        tracing::info!(
            status = result.status_label(),
            target = result.target_label(),
            passed = result.passed,
            failed = result.failed,
            skipped = result.skipped,
            duration_secs = result.duration.as_secs_f64(),
            "Test run finished"
        );
    }

    fn on_stats(&self, stats: &StatsSnapshot) {
        tracing::info!(
            events_detected = stats.events_detected,
            events_processed = stats.events_processed,
            tests_executed = stats.tests_executed,
            tests_passed = stats.tests_passed,
            tests_failed = stats.tests_failed,
            "Session statistics"
        );
    }
}

/// Sink that stores everything it receives, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Changes seen, in order.
    changes: Mutex<Vec<ChangedPath>>,
    /// Results seen, in order.
    results: Mutex<Vec<TestResult>>,
    /// Snapshots seen, in order.
    stats: Mutex<Vec<StatsSnapshot>>,
}

impl CollectingSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out the changes seen so far.
    #[must_use]
    pub fn changes(&self) -> Vec<ChangedPath> {
        self.changes.lock().clone()
    }

    /// Copies out the results seen so far.
    #[must_use]
    pub fn results(&self) -> Vec<TestResult> {
        self.results.lock().clone()
    }

    /// Copies out the snapshots seen so far.
    #[must_use]
    pub fn stats(&self) -> Vec<StatsSnapshot> {
        self.stats.lock().clone()
    }
}

impl ResultSink for CollectingSink {
    fn on_change(&self, change: &ChangedPath) {
        self.changes.lock().push(change.clone());
    }

    fn on_result(&self, result: &TestResult) {
        self.results.lock().push(result.clone());
    }

    fn on_stats(&self, stats: &StatsSnapshot) {
        self.stats.lock().push(*stats);
    }
}
