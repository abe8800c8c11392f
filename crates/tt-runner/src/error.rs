//! Error types for the tt-runner crate.

use camino::Utf8PathBuf;

/// Errors that can occur while launching a test run.
///
/// Only failures to get a run going surface here. Once the process has
/// started, outcomes like timeouts or unreadable reports are recorded on
/// the [`TestResult`](crate::result::TestResult) itself so the engine can
/// keep watching.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The test program could not be spawned.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// The program that failed to launch.
        program: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The reports directory could not be created.
    #[error("failed to create reports directory {path}: {source}")]
    ReportsDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred while driving the test process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
