//! Path classification for watch events.
//!
//! This module decides, for every path the event source reports, whether
//! the path is interesting at all and, if so, which project area it belongs
//! to and whether it is a test file.
//!
//! Classification is pure: no I/O, deterministic, and total for any UTF-8
//! path. Filtering happens at the source (in the watcher's blocking thread)
//! so ignored paths never reach the debouncer or the channel.
//!
//! # Examples
//!
//! ```
//! use tt_watcher::{Classify, SourceClassifier};
//! use tt_core::{EventKind, ProjectArea};
//! use camino::{Utf8Path, Utf8PathBuf};
//!
//! let classifier = SourceClassifier::default();
//!
//! // Build caches never pass
//! assert!(classifier.should_ignore(Utf8Path::new("shared/__pycache__/x.pyc")));
//!
//! // Source files are tagged with their area
//! let change = classifier
//!     .classify(Utf8PathBuf::from("edge/controllers/motor.py"), EventKind::Modified)
//!     .unwrap();
//! assert_eq!(change.area, ProjectArea::Edge);
//! assert!(!change.is_test);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use smallvec::SmallVec;

use tt_core::{EventKind, ProjectArea};

use crate::events::ChangedPath;

/// A classification policy for paths reported by the event source.
///
/// Implementations are called from the blocking watcher thread (for
/// [`should_ignore`](Self::should_ignore)) and from debounce timer tasks
/// (for [`classify`](Self::classify)), so they must be [`Send`] + [`Sync`]
/// and `'static`.
pub trait Classify: Send + Sync + 'static {
    /// Returns `true` if events for this path should be discarded at the
    /// source.
    fn should_ignore(&self, path: &Utf8Path) -> bool;

    /// Builds a classified change for the path, or `None` if it is ignored.
    fn classify(&self, path: Utf8PathBuf, kind: EventKind) -> Option<ChangedPath>;
}

/// The default classifier for Python project sources.
///
/// # Rules
///
/// A path is **ignored** when:
/// - its extension is not the watched source extension (`py` by default), or
/// - any path segment is in the ignore set (build caches, VCS metadata,
///   virtual environments, IDE folders), or
/// - the name carries a compiled-artifact suffix (`.pyc`, `.pyo`, `.pyd`)
///   or an `.egg-info` segment.
///
/// A non-ignored path is a **test file** when its base name starts with
/// `test_`, ends with `_test.py`, or any segment equals a test directory
/// name (`tests` or `test`).
///
/// The **area** is the first path segment matching a recognized
/// [`ProjectArea`]; paths outside all areas map to
/// [`ProjectArea::Other`].
#[derive(Debug, Clone)]
pub struct SourceClassifier {
    /// Watched source extension, without the leading dot.
    extension: &'static str,

    /// Path segments that mark a path as ignored.
    ignore_segments: SmallVec<[&'static str; 12]>,

    /// File-name suffixes of compiled artifacts.
    artifact_suffixes: SmallVec<[&'static str; 4]>,

    /// Directory segment names that mark a path as a test file.
    test_dirs: SmallVec<[&'static str; 2]>,

    /// Precomputed `_test.<ext>` suffix.
    test_suffix: String,
}

impl SourceClassifier {
    /// Creates a classifier with the default Python rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extension: "py",
            ignore_segments: SmallVec::from_slice(&[
                "__pycache__",
                ".pytest_cache",
                ".git",
                "node_modules",
                ".vscode",
                ".idea",
                "venv",
                "env",
                ".tox",
                "build",
                "dist",
            ]),
            artifact_suffixes: SmallVec::from_slice(&[".pyc", ".pyo", ".pyd"]),
            test_dirs: SmallVec::from_slice(&["tests", "test"]),
            test_suffix: "_test.py".to_owned(),
        }
    }

    /// Adds a segment to the ignore set.
    #[must_use]
    pub fn ignore_segment(mut self, segment: &'static str) -> Self {
        if !self.ignore_segments.contains(&segment) {
            self.ignore_segments.push(segment);
        }
        self
    }

    /// Returns the project area for a path.
    ///
    /// The first segment matching a recognized area wins, scanning from the
    /// path root outward.
    #[must_use]
    pub fn area_of(&self, path: &Utf8Path) -> ProjectArea {
        path.components()
            .find_map(|c| ProjectArea::from_segment(c.as_str()))
            .unwrap_or(ProjectArea::Other)
    }

    /// Returns `true` if the path names a test file.
    #[must_use]
    pub fn is_test_file(&self, path: &Utf8Path) -> bool {
        let by_name = path
            .file_name()
            .is_some_and(|name| name.starts_with("test_") || name.ends_with(&self.test_suffix));
        by_name
            || path
                .components()
                .any(|c| self.test_dirs.contains(&c.as_str()))
    }

    fn has_watched_extension(&self, path: &Utf8Path) -> bool {
        path.extension() == Some(self.extension)
    }

    fn in_ignored_segment(&self, path: &Utf8Path) -> bool {
        path.components().any(|c| {
            let seg = c.as_str();
            self.ignore_segments.contains(&seg) || seg.ends_with(".egg-info")
        })
    }

    fn is_compiled_artifact(&self, path: &Utf8Path) -> bool {
        let name = path.as_str();
        self.artifact_suffixes.iter().any(|s| name.ends_with(s))
    }
}

impl Default for SourceClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classify for SourceClassifier {
    fn should_ignore(&self, path: &Utf8Path) -> bool {
        if self.is_compiled_artifact(path) || self.in_ignored_segment(path) {
            return true;
        }
        !self.has_watched_extension(path)
    }

    fn classify(&self, path: Utf8PathBuf, kind: EventKind) -> Option<ChangedPath> {
        if self.should_ignore(&path) {
            return None;
        }
        let area = self.area_of(&path);
        let is_test = self.is_test_file(&path);
        Some(ChangedPath::new(path, kind, area, is_test))
    }
}

// Implement Classify for Arc-wrapped classifiers (shared between the
// watcher bridge and the debouncer).
impl<C: Classify + ?Sized> Classify for std::sync::Arc<C> {
    fn should_ignore(&self, path: &Utf8Path) -> bool {
        (**self).should_ignore(path)
    }

    fn classify(&self, path: Utf8PathBuf, kind: EventKind) -> Option<ChangedPath> {
        (**self).classify(path, kind)
    }
}
