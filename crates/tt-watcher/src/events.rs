//! Event types for file change notifications.
//!
//! Two event types move through the pipeline:
//!
//! - [`RawEvent`] - a raw notification from the event source, already
//!   filtered for ignored paths but not yet debounced.
//! - [`ChangedPath`] - a fully classified change, built once per debounce
//!   window from the most recent raw event kind seen for a path.
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//!   RawEvent (notify bridge, ignore-filtered)
//!        │
//!        ▼
//!   Debouncer (per-path quiet window, last kind wins)
//!        │
//!        ▼
//!   ChangedPath (classified) ──► engine
//! ```

use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};

use tt_core::{EventKind, ProjectArea};

/// A raw, ignore-filtered notification from the event source.
///
/// Carries only the path and the event kind; classification into a project
/// area happens after debouncing so that a burst of edits is classified
/// once, not once per keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Absolute path of the file that changed.
    pub path: Utf8PathBuf,

    /// What happened to the file.
    pub kind: EventKind,
}

impl RawEvent {
    /// Creates a new raw event.
    #[inline]
    #[must_use]
    pub const fn new(path: Utf8PathBuf, kind: EventKind) -> Self {
        Self { path, kind }
    }
}

/// A classified file change, delivered once per debounce window.
///
/// Immutable after construction; built only by a
/// [`Classify`](crate::classify::Classify) implementation. The `kind` is
/// the most recent raw kind observed within the window (earlier kinds in
/// the same window are discarded by design).
///
/// # Examples
///
/// ```
/// use tt_watcher::ChangedPath;
/// use tt_core::{EventKind, ProjectArea};
/// use camino::Utf8PathBuf;
///
/// let change = ChangedPath::new(
///     Utf8PathBuf::from("/proj/shared/models/data.py"),
///     EventKind::Modified,
///     ProjectArea::Shared,
///     false,
/// );
/// assert_eq!(change.area, ProjectArea::Shared);
/// assert!(!change.is_test);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedPath {
    /// Absolute path of the file that changed.
    pub path: Utf8PathBuf,

    /// The most recent event kind observed within the debounce window.
    pub kind: EventKind,

    /// Wall-clock time the change was delivered.
    pub timestamp: SystemTime,

    /// Which project area the path belongs to.
    pub area: ProjectArea,

    /// Whether the path is itself a test file.
    pub is_test: bool,
}

impl ChangedPath {
    /// Creates a new classified change with the current wall-clock time.
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: EventKind, area: ProjectArea, is_test: bool) -> Self {
        Self {
            path,
            kind,
            timestamp: SystemTime::now(),
            area,
            is_test,
        }
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }

    /// Returns the path relative to `root` when possible, else the full path.
    #[must_use]
    pub fn relative_to<'a>(&'a self, root: &Utf8Path) -> &'a Utf8Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }

    /// Returns a one-line description for logs and result records.
    ///
    /// # Examples
    ///
    /// ```
    /// use tt_watcher::ChangedPath;
    /// use tt_core::{EventKind, ProjectArea};
    /// use camino::Utf8PathBuf;
    ///
    /// let change = ChangedPath::new(
    ///     Utf8PathBuf::from("/p/edge/motor.py"),
    ///     EventKind::Created,
    ///     ProjectArea::Edge,
    ///     false,
    /// );
    /// assert_eq!(change.describe(), "created /p/edge/motor.py");
    /// ```
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_event_new() {
        let event = RawEvent::new(Utf8PathBuf::from("/p/a.py"), EventKind::Created);
        assert_eq!(event.path.as_str(), "/p/a.py");
        assert_eq!(event.kind, EventKind::Created);
    }

    #[test]
    fn test_changed_path_file_name() {
        let change = ChangedPath::new(
            Utf8PathBuf::from("/p/shared/models/data.py"),
            EventKind::Modified,
            ProjectArea::Shared,
            false,
        );
        assert_eq!(change.file_name(), Some("data.py"));
    }

    #[test]
    fn test_changed_path_relative_to() {
        let change = ChangedPath::new(
            Utf8PathBuf::from("/p/tests/unit/test_models.py"),
            EventKind::Modified,
            ProjectArea::Tests,
            true,
        );
        assert_eq!(
            change.relative_to(Utf8Path::new("/p")).as_str(),
            "tests/unit/test_models.py"
        );
        // Unrelated root falls back to the full path
        assert_eq!(
            change.relative_to(Utf8Path::new("/elsewhere")).as_str(),
            "/p/tests/unit/test_models.py"
        );
    }

    #[test]
    fn test_changed_path_describe() {
        let change = ChangedPath::new(
            Utf8PathBuf::from("/p/edge/motor.py"),
            EventKind::Deleted,
            ProjectArea::Edge,
            false,
        );
        assert_eq!(change.describe(), "deleted /p/edge/motor.py");
    }
}
