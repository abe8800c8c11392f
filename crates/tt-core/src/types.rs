//! Domain enums shared across the workspace.
//!
//! This module provides the [`EventKind`] enum for raw filesystem event
//! kinds and the [`ProjectArea`] enum tagging which part of the source
//! tree a file belongs to.

use serde::{Deserialize, Serialize};

/// The kind of a raw filesystem event.
///
/// Produced by the event source for every notification and carried through
/// debouncing unchanged. Within a debounce window only the most recent kind
/// for a path survives.
///
/// # Examples
///
/// ```
/// use tt_core::EventKind;
///
/// let kind = EventKind::Modified;
/// assert_eq!(kind.label(), "modified");
/// assert!(!kind.is_deleted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A file was created.
    Created,
    /// A file's contents or metadata changed.
    Modified,
    /// A file was removed.
    Deleted,
}

impl EventKind {
    /// Returns a short lowercase label for display.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }

    /// Returns `true` if this event represents a deletion.
    ///
    /// Deleted files still count as processed events but never trigger
    /// test runs.
    #[inline]
    #[must_use]
    pub const fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A coarse tag identifying which part of the project a file belongs to.
///
/// Areas are matched against path segments in declaration order; the first
/// recognized segment wins. Anything outside the recognized set maps to
/// [`Other`](Self::Other).
///
/// The set is a closed enumeration: test selection is driven by an explicit
/// area-to-suites table, never by dynamic name construction.
///
/// # Examples
///
/// ```
/// use tt_core::ProjectArea;
///
/// assert_eq!(ProjectArea::from_segment("shared"), Some(ProjectArea::Shared));
/// assert_eq!(ProjectArea::from_segment("vendor"), None);
/// assert_eq!(ProjectArea::Edge.label(), "edge");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ProjectArea {
    /// Foundational models shared between edge and cloud.
    Shared,
    /// Edge computing code (controllers, manual control, offline drawing).
    Edge,
    /// Cloud services (orchestrator, aggregator, dashboard).
    Cloud,
    /// Test suites (unit, integration, e2e).
    Tests,
    /// Development and automation scripts.
    Scripts,
    /// Not under any recognized area.
    #[default]
    Other,
}

impl ProjectArea {
    /// All recognized areas, in segment-matching order.
    ///
    /// [`Other`](Self::Other) is deliberately excluded: it is the fallback,
    /// not a matchable segment.
    pub const RECOGNIZED: [Self; 5] = [
        Self::Shared,
        Self::Edge,
        Self::Cloud,
        Self::Tests,
        Self::Scripts,
    ];

    /// Parses a single path segment into an area, if recognized.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "shared" => Some(Self::Shared),
            "edge" => Some(Self::Edge),
            "cloud" => Some(Self::Cloud),
            "tests" => Some(Self::Tests),
            "scripts" => Some(Self::Scripts),
            _ => None,
        }
    }

    /// Returns the lowercase directory name for this area.
    ///
    /// [`Other`](Self::Other) has no directory; its label is `"other"`.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Edge => "edge",
            Self::Cloud => "cloud",
            Self::Tests => "tests",
            Self::Scripts => "scripts",
            Self::Other => "other",
        }
    }

    /// Returns a human-readable description of what lives in this area.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Shared => "Foundational models (blockchain data, motor commands, sessions)",
            Self::Edge => "Edge computing (motor controller, manual control, offline drawing)",
            Self::Cloud => "Cloud services (orchestrator, data aggregator, user dashboard)",
            Self::Tests => "Test suites (unit, integration, e2e)",
            Self::Scripts => "Development scripts (TDD workflow, automation)",
            Self::Other => "Outside the recognized project areas",
        }
    }
}

impl std::fmt::Display for ProjectArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
