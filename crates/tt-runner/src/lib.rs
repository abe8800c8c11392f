//! Test selection, pytest execution, and report parsing.
//!
//! This crate is the back half of the test-trigger pipeline: a debounced
//! [`ChangedPath`](tt_watcher::ChangedPath) is mapped to one or more test
//! suites, each suite is executed as a bounded child process, and the
//! resulting pytest JSON report is parsed into a [`TestResult`].
//!
//! # Pipeline
//!
//! ```text
//! ChangedPath ──► TestSelector ──► ProcessRunner ──► ResultParser ──► TestResult
//!                 (area table)     (tokio::process   (JSON report +
//!                                   + timeout)        coverage scan)
//! ```
//!
//! # Degradation, not failure
//!
//! Once a process has been spawned, nothing here returns `Err`: timeouts
//! and unreadable reports become [`TestResult`]s carrying an
//! [`ExecutionError`], so a single bad run never takes down the watch
//! loop. Only launch problems ([`RunError::Spawn`]) and filesystem
//! failures around the reports directory surface as errors.
//!
//! # Usage
//!
//! ```no_run
//! use tt_core::{ProjectConfig, RunnerConfig};
//! use tt_runner::{ProcessRunner, ResultParser};
//!
//! # async fn example() -> Result<(), tt_runner::RunError> {
//! let project = ProjectConfig::default();
//! let runner = ProcessRunner::new(&project, &RunnerConfig::default()).await?;
//! let parser = ResultParser::new();
//!
//! let output = runner.run(None).await?; // full suite
//! let result = parser.parse(&output, None, None).await;
//! println!("{}: {} passed, {} failed", result.status_label(), result.passed, result.failed);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod report;
pub mod result;
pub mod runner;
pub mod select;

// Re-export error types
pub use error::RunError;

// Re-export result types
pub use result::{ExecutionError, TestResult};

// Re-export pipeline stages
pub use report::{ResultParser, MAX_FAILURE_DETAILS};
pub use runner::{ProcessRunner, RunOutput};
pub use select::{TestSelector, TestTarget, DEFAULT_SUITE};
