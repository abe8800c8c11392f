//! Watch-session orchestration.
//!
//! The [`Orchestrator`] wires the whole pipeline together: it validates
//! the project, starts the file watcher over the monitored directories,
//! routes raw events through the debouncer, maps debounced changes to
//! test suites, and feeds the serialized run queue. A session runs until
//! its stop signal fires, then shuts the stages down in dependency order
//! so nothing enqueues into a closed queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use tt_core::Config;
use tt_runner::{ProcessRunner, ResultParser, TestSelector};
use tt_watcher::{ChangedPath, Debouncer, FileWatcher, SourceClassifier};

use crate::error::EngineError;
use crate::queue::{RunQueue, RunRequest};
use crate::sink::ResultSink;
use crate::stats::{RunStats, StatsSnapshot};

/// How long the watcher and the queue worker each get to wind down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Capacity of the debounced-change channel.
const CHANGE_CHANNEL_CAPACITY: usize = 100;

/// Runs a watch session end to end.
///
/// Construction is cheap; all resources are acquired inside
/// [`run`](Self::run), which either starts completely or fails before a
/// single task has been spawned.
pub struct Orchestrator<S: ResultSink> {
    config: Config,
    sink: Arc<S>,
    stats: Arc<RunStats>,
    auto_tests: bool,
}

impl<S: ResultSink> Orchestrator<S> {
    /// Creates an orchestrator for `config` reporting through `sink`.
    pub fn new(config: Config, sink: S) -> Self {
        Self {
            config,
            sink: Arc::new(sink),
            stats: Arc::new(RunStats::new()),
            auto_tests: true,
        }
    }

    /// Shared handle to the session statistics.
    #[must_use]
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Disables or re-enables test triggering.
    ///
    /// With auto-tests off the session still watches, debounces, and
    /// counts changes; it just never enqueues a run.
    pub fn set_auto_tests(&mut self, enabled: bool) {
        self.auto_tests = enabled;
    }

    /// Runs the session until `stop` fires, returning the final
    /// statistics snapshot.
    ///
    /// # Errors
    ///
    /// Fails before watching starts when the project does not validate,
    /// the watcher cannot be created, or the reports directory cannot be
    /// set up. Nothing is left running on error.
    pub async fn run(self, mut stop: oneshot::Receiver<()>) -> Result<StatsSnapshot, EngineError> {
        self.config.project.validate()?;

        let roots = self.config.project.existing_monitored_dirs();
        tracing::info!(
            root = %self.config.project.root,
            dirs = ?roots.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            debounce_ms = self.config.watch.debounce_ms,
            auto_tests = self.auto_tests,
            "Starting watch session"
        );

        let classifier = Arc::new(SourceClassifier::new());
        let mut watcher =
            FileWatcher::new(&roots, &self.config.watch, Arc::clone(&classifier)).await?;

        let runner = ProcessRunner::new(&self.config.project, &self.config.runner).await?;
        let worker_grace = runner.timeout() + SHUTDOWN_GRACE;
        let queue = RunQueue::start(
            runner,
            ResultParser::new(),
            Arc::clone(&self.stats),
            Arc::clone(&self.sink),
        );

        let (change_tx, mut change_rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);
        let debouncer = Debouncer::new(
            Duration::from_millis(self.config.watch.debounce_ms),
            classifier,
            change_tx,
        );

        let selector = TestSelector::new(&self.config.project);

        loop {
            tokio::select! {
                raw = watcher.recv() => {
                    match raw {
                        Some(event) => {
                            self.stats.increment_detected();
                            debouncer.notify(event.path, event.kind);
                        }
                        None => {
                            tracing::warn!("Event source closed, stopping session");
                            break;
                        }
                    }
                }
                Some(change) = change_rx.recv() => {
                    self.handle_change(change, &selector, &queue).await;
                }
                _ = &mut stop => {
                    tracing::info!("Stop requested");
                    break;
                }
            }
        }

        // Wind down back to front: no new timers, then no new events,
        // then drain the queue.
        debouncer.cancel_all();

        if let Err(error) = watcher.shutdown(SHUTDOWN_GRACE).await {
            tracing::warn!(error = %error, "Watcher did not stop cleanly");
        }

        queue.shutdown(worker_grace).await;

        let snapshot = self.stats.snapshot();
        self.sink.on_stats(&snapshot);
        Ok(snapshot)
    }

    /// Handles one debounced change: count it, report it, and enqueue
    /// the selected suites in order.
    async fn handle_change(&self, change: ChangedPath, selector: &TestSelector, queue: &RunQueue) {
        self.stats.increment_processed();
        self.sink.on_change(&change);

        if change.kind.is_deleted() {
            tracing::info!(path = %change.path, "File deleted, skipping test run");
            return;
        }

        if !self.auto_tests {
            tracing::debug!(path = %change.path, "Auto-tests disabled, counting only");
            return;
        }

        let targets = selector.select(&change);
        if targets.is_empty() {
            tracing::info!(path = %change.path, "No test suites mapped, nothing to run");
            return;
        }

        let trigger = change.describe();
        for target in targets {
            tracing::info!(suite = %target.path, trigger = %trigger, "Queueing test run");
            let accepted = queue
                .enqueue(RunRequest {
                    target: Some(target.path),
                    trigger: Some(trigger.clone()),
                })
                .await;
            if !accepted {
                tracing::warn!("Run queue closed, dropping request");
                return;
            }
        }
    }
}
