//! Per-path event debouncing.
//!
//! A save operation from an editor often produces several raw notifications
//! for the same file within milliseconds. The [`Debouncer`] collapses every
//! burst into a single delivery: each [`notify`](Debouncer::notify) call
//! cancels the path's pending delivery (if any) and schedules a fresh one
//! after the full quiet window, carrying the **most recent** event kind.
//!
//! # Last-kind-wins
//!
//! Only the latest kind within a window survives. A file created and then
//! deleted inside one window is delivered as `deleted`; the create is
//! discarded. This mirrors the editor-burst use case the debouncer exists
//! for and is the documented policy, not an accident.
//!
//! # Locking
//!
//! The pending-entries table is guarded by a single `parking_lot` mutex
//! covering every read-modify-write. Timer tasks re-acquire the lock when
//! they fire and check their generation number, so a delivery that lost a
//! race with a newer `notify` call is a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tt_core::{EventKind, FxHashMap};

use crate::classify::Classify;
use crate::events::ChangedPath;

/// A pending delivery for one path.
///
/// At most one entry exists per path at any time; a new raw event for the
/// same path replaces the entry and aborts its timer task.
struct PendingEntry {
    /// Most recent event kind observed for the path.
    kind: EventKind,

    /// Generation counter guarding against stale timer fires.
    generation: u64,

    /// Abortable handle to the scheduled delivery task.
    handle: JoinHandle<()>,
}

/// Coalesces bursts of raw events into single classified deliveries.
///
/// Deliveries are sent on the channel given at construction. Timer tasks
/// for different paths run concurrently; deliveries for one path are
/// strictly one per quiet window.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio::sync::mpsc;
/// use tt_watcher::{Debouncer, SourceClassifier};
/// use tt_core::EventKind;
/// use camino::Utf8PathBuf;
///
/// # async fn example() {
/// let (tx, mut rx) = mpsc::channel(64);
/// let debouncer = Debouncer::new(
///     Duration::from_millis(2000),
///     Arc::new(SourceClassifier::default()),
///     tx,
/// );
///
/// // Five rapid saves of the same file...
/// for _ in 0..5 {
///     debouncer.notify(Utf8PathBuf::from("/p/shared/data.py"), EventKind::Modified);
/// }
///
/// // ...produce exactly one delivery after the quiet window.
/// let change = rx.recv().await.unwrap();
/// assert_eq!(change.kind, EventKind::Modified);
/// # }
/// ```
pub struct Debouncer<C: Classify> {
    delay: Duration,
    classifier: Arc<C>,
    pending: Arc<Mutex<FxHashMap<Utf8PathBuf, PendingEntry>>>,
    generation: AtomicU64,
    tx: mpsc::Sender<ChangedPath>,
}

impl<C: Classify> std::fmt::Debug for Debouncer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl<C: Classify> Debouncer<C> {
    /// Creates a debouncer delivering classified changes on `tx`.
    ///
    /// Must be called from within a tokio runtime: each `notify` spawns a
    /// timer task.
    #[must_use]
    pub fn new(delay: Duration, classifier: Arc<C>, tx: mpsc::Sender<ChangedPath>) -> Self {
        Self {
            delay,
            classifier,
            pending: Arc::new(Mutex::new(FxHashMap::default())),
            generation: AtomicU64::new(0),
            tx,
        }
    }

    /// Records a raw event, replacing any pending delivery for the path.
    ///
    /// The previous timer for the same path (if any) is cancelled before
    /// the replacement is scheduled with a fresh full delay, so the window
    /// restarts on every event.
    pub fn notify(&self, path: Utf8PathBuf, kind: EventKind) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        let pending = Arc::clone(&self.pending);
        let classifier = Arc::clone(&self.classifier);
        let tx = self.tx.clone();
        let delay = self.delay;
        let task_path = path.clone();

        // Hold the lock across the spawn so the entry is in the table before
        // the timer task can observe it. With a near-zero delay the task may
        // fire immediately; it then blocks on this lock until the insert
        // below has completed.
        let mut table = self.pending.lock();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Take the entry only if this task is still the current one.
            let kind = {
                let mut table = pending.lock();
                match table.get(&task_path) {
                    Some(entry) if entry.generation == generation => {
                        let kind = entry.kind;
                        table.remove(&task_path);
                        kind
                    }
                    _ => return,
                }
            };

            if let Some(change) = classifier.classify(task_path, kind) {
                if tx.send(change).await.is_err() {
                    tracing::debug!("Debounce channel closed, dropping delivery");
                }
            }
        });

        if let Some(previous) = table.insert(
            path,
            PendingEntry {
                kind,
                generation,
                handle,
            },
        ) {
            previous.handle.abort();
        }
    }

    /// Cancels every pending delivery without firing callbacks.
    ///
    /// Used during orchestrator shutdown so no test run starts after the
    /// stop signal.
    pub fn cancel_all(&self) {
        let mut table = self.pending.lock();
        let cancelled = table.len();
        for (_, entry) in table.drain() {
            entry.handle.abort();
        }
        if cancelled > 0 {
            tracing::debug!(cancelled, "Cancelled pending debounce deliveries");
        }
    }

    /// Returns the number of paths with a pending delivery.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}
