//! Event-source bridge with async event streaming.
//!
//! This module provides the [`FileWatcher`] type that bridges the
//! synchronous `notify` file watching crate to the async tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                  Notify Backend Thread                         │
//! │  ┌───────────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │ RecommendedWatcher│ → │ kind mapping │ → │ ignore filter│  │
//! │  │ (notify, N roots) │   │              │   │ (classifier) │  │
//! │  └───────────────────┘   └──────────────┘   └──────┬───────┘  │
//! └─────────────────────────────────────────────────────│──────────┘
//!                                         blocking_send │
//!                                                       ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                  Async Runtime (tokio)                         │
//! │  ┌──────────────┐   ┌────────────────┐                         │
//! │  │ FileWatcher  │   │ mpsc::Receiver │ → engine → Debouncer    │
//! │  │ (shutdown)   │   │ (RawEvent)     │                         │
//! │  └──────────────┘   └────────────────┘                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The OS watcher is created and every root registered *before*
//! [`FileWatcher::new`] returns, so registration failures (inotify
//! limits, permissions) are startup errors, not a silently dead event
//! stream. A `spawn_blocking` task keeps the watcher alive until the
//! shutdown signal.
//!
//! Debouncing deliberately happens on the async side (see
//! [`Debouncer`](crate::debounce::Debouncer)): the blocking thread only
//! maps, filters, and forwards, so the ignore rules run before any event
//! crosses the channel.

use std::time::Duration;

use camino::Utf8PathBuf;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tt_core::{EventKind, WatchConfig};

use crate::classify::Classify;
use crate::error::WatchError;
use crate::events::RawEvent;

/// Default channel capacity for raw events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Maps a notify event kind onto the pipeline's [`EventKind`].
///
/// Access events and catch-all kinds are dropped: the pipeline only cares
/// about create, modify, and delete.
fn map_event_kind(kind: notify::EventKind) -> Option<EventKind> {
    use notify::EventKind as NK;
    match kind {
        NK::Create(_) => Some(EventKind::Created),
        NK::Modify(_) => Some(EventKind::Modified),
        NK::Remove(_) => Some(EventKind::Deleted),
        NK::Access(_) | NK::Any | NK::Other => None,
    }
}

/// A multi-root file watcher that streams raw events to an async context.
///
/// `FileWatcher` manages a background thread running the `notify` watcher
/// registered on every monitored root. Events are kind-mapped and
/// ignore-filtered before being sent through a bounded tokio mpsc channel,
/// so ignored paths never reach the async side at all.
///
/// # Lifecycle
///
/// 1. **Creation**: [`FileWatcher::new`] validates every root, registers
///    each with the OS watcher, and spawns the keep-alive task.
/// 2. **Event Reception**: [`recv`](Self::recv) /
///    [`try_recv`](Self::try_recv) yield [`RawEvent`]s.
/// 3. **Shutdown**: [`shutdown`](Self::shutdown) for a graceful stop;
///    dropping the watcher sends the shutdown signal without awaiting.
pub struct FileWatcher {
    /// Shutdown signal sender; `None` once shutdown is initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking task keeping the OS watcher alive.
    task_handle: Option<JoinHandle<()>>,

    /// Raw event receiver for async consumption.
    event_rx: mpsc::Receiver<RawEvent>,

    /// The roots being watched.
    watch_roots: Vec<Utf8PathBuf>,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_roots", &self.watch_roots)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Creates a watcher over the given roots.
    ///
    /// Every root must exist; each is registered with the OS watcher
    /// (recursively when the config says so). The classifier's ignore
    /// rules are applied in the blocking thread before events are sent.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::NoWatchRoots`] for an empty root list,
    /// [`WatchError::PathNotFound`] if a root is missing, or
    /// [`WatchError::Notify`] if the OS watcher fails to initialize or
    /// to register a root.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<C: Classify>(
        roots: &[Utf8PathBuf],
        config: &WatchConfig,
        classifier: C,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(roots, config, classifier, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Creates a watcher with a custom event channel capacity.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn with_capacity<C: Classify>(
        roots: &[Utf8PathBuf],
        config: &WatchConfig,
        classifier: C,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if roots.is_empty() {
            return Err(WatchError::NoWatchRoots);
        }

        let mut watch_roots = Vec::with_capacity(roots.len());
        for root in roots {
            if !root.exists() {
                return Err(WatchError::path_not_found(root.clone()));
            }
            watch_roots.push(root.canonicalize_utf8().map_err(WatchError::Io)?);
        }

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        // Register the roots before returning so an OS watcher failure
        // (inotify limits, permissions) surfaces here as an error instead
        // of silently ending the event stream later.
        let os_watcher = start_os_watcher(&watch_roots, config.recursive, event_tx, classifier)?;

        let task_handle = tokio::task::spawn_blocking(move || {
            // The OS watcher delivers events from its own thread; this task
            // only keeps it alive until the shutdown signal arrives.
            let _os_watcher = os_watcher;
            let _ = shutdown_rx.blocking_recv();
            tracing::info!("File watcher stopped");
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_roots,
        })
    }

    /// Receives the next raw event asynchronously.
    ///
    /// Returns `None` when the watcher has been shut down.
    pub async fn recv(&mut self) -> Option<RawEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a raw event without blocking.
    pub fn try_recv(&mut self) -> Result<RawEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Exposes the raw event receiver for use in `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<RawEvent> {
        &mut self.event_rx
    }

    /// Returns the canonicalized roots being watched.
    #[must_use]
    pub fn watch_roots(&self) -> &[Utf8PathBuf] {
        &self.watch_roots
    }

    /// Returns `true` if the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Gracefully shuts down the watcher within the given grace period.
    ///
    /// Sends the shutdown signal, then waits up to `grace` for the
    /// blocking task to quiesce. An overrun is reported as
    /// [`WatchError::ChannelClosed`] so callers can log it as a non-fatal
    /// warning and proceed.
    pub async fn shutdown(mut self, grace: Duration) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match tokio::time::timeout(grace, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) | Err(_) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        // Send shutdown signal on drop. Drop is sync, so the task is not
        // awaited; it stops when it receives the signal.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Creates the notify watcher and registers every root on it.
///
/// The returned watcher forwards filtered events to the async channel from
/// notify's own thread for as long as it is kept alive.
fn start_os_watcher<C: Classify>(
    roots: &[Utf8PathBuf],
    recursive: bool,
    event_tx: mpsc::Sender<RawEvent>,
    classifier: C,
) -> Result<RecommendedWatcher, WatchError> {
    let tx = event_tx;
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let Some(kind) = map_event_kind(event.kind) else {
                    return;
                };
                for path in event.paths {
                    let utf8_path = match Utf8PathBuf::try_from(path) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(
                                path = %e.as_path().display(),
                                "Skipping non-UTF-8 path in file event"
                            );
                            continue;
                        }
                    };

                    if classifier.should_ignore(&utf8_path) {
                        tracing::trace!(path = %utf8_path, "Ignored file event");
                        continue;
                    }

                    if tx.blocking_send(RawEvent::new(utf8_path, kind)).is_err() {
                        tracing::debug!("Event channel closed, dropping event");
                        return;
                    }
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Watcher backend error");
            }
        },
    )?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    for root in roots {
        watcher.watch(root.as_std_path(), mode)?;
        tracing::info!(root = %root, recursive, "Watching directory");
    }

    Ok(watcher)
}
