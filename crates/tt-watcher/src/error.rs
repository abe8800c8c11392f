//! Error types for the tt-watcher crate.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching.
///
/// Every variant here is fatal to the watching session: the event source
/// either failed to start or stopped delivering. Recoverable per-event
/// problems (non-UTF-8 paths, unclassifiable events) are logged and
/// skipped inside the watcher loop instead of surfacing as errors.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// A watch root does not exist.
    #[error("watch root does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// No watch roots were given.
    ///
    /// Starting a watcher over zero directories would silently watch
    /// nothing; callers must validate the project first.
    #[error("no directories to watch")]
    NoWatchRoots,

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// An I/O error occurred during path validation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }
}
