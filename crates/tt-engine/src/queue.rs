//! Single-worker queue serializing test runs.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use camino::Utf8PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tt_runner::{ProcessRunner, ResultParser, TestResult};

use crate::sink::ResultSink;
use crate::stats::RunStats;

/// Default depth of the run queue.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One requested test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Suite to run, relative to the project root; `None` for the full
    /// suite.
    pub target: Option<Utf8PathBuf>,
    /// Description of the change that caused the request, for display.
    pub trigger: Option<String>,
}

/// A FIFO queue with exactly one worker executing test runs.
///
/// Every change in the process funnels into this queue, so runs are
/// strictly serialized: a burst of changes produces a backlog, never
/// overlapping pytest processes fighting over the same reports and
/// coverage files. The worker owns the runner, the parser, the shared
/// statistics, and the sink; a failed run is reported through the sink
/// and the worker moves on.
#[derive(Debug)]
pub struct RunQueue {
    tx: Option<mpsc::Sender<RunRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl RunQueue {
    /// Starts the worker task with the default queue depth.
    #[must_use]
    pub fn start<S: ResultSink>(
        runner: ProcessRunner,
        parser: ResultParser,
        stats: Arc<RunStats>,
        sink: Arc<S>,
    ) -> Self {
        Self::with_capacity(runner, parser, stats, sink, DEFAULT_QUEUE_CAPACITY)
    }

    /// Starts the worker task with a custom queue depth.
    #[must_use]
    pub fn with_capacity<S: ResultSink>(
        runner: ProcessRunner,
        parser: ResultParser,
        stats: Arc<RunStats>,
        sink: Arc<S>,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_worker(rx, runner, parser, stats, sink));
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Enqueues a run, waiting for queue space if needed.
    ///
    /// Returns `false` when the queue has already been shut down.
    pub async fn enqueue(&self, request: RunRequest) -> bool {
        match &self.tx {
            Some(tx) => tx.send(request).await.is_ok(),
            None => false,
        }
    }

    /// Closes the queue and waits up to `grace` for the worker to drain.
    ///
    /// An in-flight run may finish normally or hit its own timeout inside
    /// the grace period; an overrun aborts the worker with a warning.
    pub async fn shutdown(mut self, grace: Duration) {
        self.tx.take();

        if let Some(worker) = self.worker.take() {
            match tokio::time::timeout(grace, worker).await {
                Ok(Ok(())) => {}
                Ok(Err(join_error)) => {
                    tracing::warn!(error = %join_error, "Run queue worker panicked");
                }
                Err(_elapsed) => {
                    tracing::warn!(
                        grace_secs = grace.as_secs(),
                        "Run queue worker did not drain in time, aborting"
                    );
                }
            }
        }
    }
}

impl Drop for RunQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit on its own.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

async fn run_worker<S: ResultSink>(
    mut rx: mpsc::Receiver<RunRequest>,
    runner: ProcessRunner,
    parser: ResultParser,
    stats: Arc<RunStats>,
    sink: Arc<S>,
) {
    while let Some(request) = rx.recv().await {
        stats.increment_executed();

        let target = request.target.as_deref();
        let trigger = request.trigger.as_deref();

        let result = match runner.run(target).await {
            Ok(output) => parser.parse(&output, target, trigger).await,
            Err(error) => {
                tracing::error!(error = %error, target = ?target, "Test run failed to launch");
                launch_failure_result(&request, &error)
            }
        };

        if result.success {
            stats.increment_passed();
        } else {
            stats.increment_failed();
        }

        sink.on_result(&result);
    }

    tracing::debug!("Run queue worker stopped");
}

/// Result shape for a run that never got a process off the ground.
fn launch_failure_result(request: &RunRequest, error: &tt_runner::RunError) -> TestResult {
    TestResult {
        target: request.target.clone(),
        trigger: request.trigger.clone(),
        timestamp: SystemTime::now(),
        success: false,
        total: 0,
        passed: 0,
        failed: 0,
        skipped: 0,
        errors: 0,
        duration: Duration::ZERO,
        coverage_percent: None,
        failure_details: vec![error.to_string()],
        execution_error: Some(tt_runner::ExecutionError::Other(error.to_string())),
        report_path: None,
    }
}
