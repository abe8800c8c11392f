//! Maps a changed file to the test suites that should run.

use camino::{Utf8Path, Utf8PathBuf};

use tt_core::{ProjectArea, ProjectConfig};
use tt_watcher::ChangedPath;

/// Suite run when nothing more specific matches a change.
pub const DEFAULT_SUITE: &str = "tests/unit/test_foundational_models.py";

/// A test suite chosen for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTarget {
    /// Suite path relative to the project root.
    pub path: Utf8PathBuf,
    /// Whether the suite file was present on disk at selection time.
    pub exists: bool,
}

impl TestTarget {
    fn probe(root: &Utf8Path, relative: impl Into<Utf8PathBuf>) -> Self {
        let path = relative.into();
        let exists = root.join(&path).is_file();
        Self { path, exists }
    }
}

/// Returns the suites associated with a project area, in run order.
///
/// The table mirrors the project's layout: each source area has a fixed
/// set of unit and integration suites that cover it.
#[must_use]
pub fn suites_for_area(area: ProjectArea) -> &'static [&'static str] {
    match area {
        ProjectArea::Shared => &["tests/unit/test_foundational_models.py"],
        ProjectArea::Edge => &[
            "tests/unit/test_edge_controllers.py",
            "tests/integration/test_edge_integration.py",
        ],
        ProjectArea::Cloud => &[
            "tests/unit/test_cloud_services.py",
            "tests/integration/test_cloud_integration.py",
        ],
        ProjectArea::Scripts => &[
            "tests/integration/test_tdd_workflow.py",
            "tests/unit/test_scripts.py",
        ],
        _ => &[],
    }
}

/// Chooses which suites to run for a debounced change.
///
/// A changed test file selects exactly itself, whether or not it is
/// still on disk; a source change selects the suites mapped to its area.
/// Mapped suites missing from disk are dropped, and an empty mapping
/// falls back to [`DEFAULT_SUITE`] when that exists. An empty result is
/// a no-op for the caller, never an error.
#[derive(Debug, Clone)]
pub struct TestSelector {
    root: Utf8PathBuf,
}

impl TestSelector {
    /// Creates a selector rooted at the project's directory.
    #[must_use]
    pub fn new(project: &ProjectConfig) -> Self {
        Self {
            root: project.root.clone(),
        }
    }

    /// Selects the suites to run for `change`, in execution order.
    #[must_use]
    pub fn select(&self, change: &ChangedPath) -> Vec<TestTarget> {
        if change.is_test {
            let relative = change.relative_to(&self.root).to_owned();
            return vec![TestTarget::probe(&self.root, relative)];
        }

        let mapped: Vec<TestTarget> = suites_for_area(change.area)
            .iter()
            .map(|suite| TestTarget::probe(&self.root, *suite))
            .filter(|target| target.exists)
            .collect();

        if !mapped.is_empty() {
            return mapped;
        }

        let fallback = TestTarget::probe(&self.root, DEFAULT_SUITE);
        if fallback.exists {
            vec![fallback]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tt_core::EventKind;

    fn project_in(dir: &TempDir) -> ProjectConfig {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        ProjectConfig {
            root,
            ..ProjectConfig::default()
        }
    }

    fn write_suite(root: &Utf8Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path()).expect("create suite dir");
        }
        fs::write(path.as_std_path(), "def test_ok():\n    assert True\n").expect("write suite");
    }

    fn change(path: &str, area: ProjectArea, is_test: bool) -> ChangedPath {
        ChangedPath::new(Utf8PathBuf::from(path), EventKind::Modified, area, is_test)
    }

    #[test]
    fn test_changed_test_file_selects_itself() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        write_suite(&project.root, "tests/unit/test_models.py");

        let selector = TestSelector::new(&project);
        let changed = project.root.join("tests/unit/test_models.py");
        let targets = selector.select(&change(changed.as_str(), ProjectArea::Tests, true));

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].path, Utf8Path::new("tests/unit/test_models.py"));
    }

    #[test]
    fn test_changed_test_file_selects_itself_even_when_gone() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        write_suite(&project.root, DEFAULT_SUITE);

        let selector = TestSelector::new(&project);
        let changed = project.root.join("tests/unit/test_vanished.py");
        let targets = selector.select(&change(changed.as_str(), ProjectArea::Tests, true));

        // No fall-through to the area mapping or the default suite.
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].path, Utf8Path::new("tests/unit/test_vanished.py"));
        assert!(!targets[0].exists);
    }

    #[test]
    fn test_area_mapping_preserves_table_order() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        write_suite(&project.root, "tests/unit/test_edge_controllers.py");
        write_suite(&project.root, "tests/integration/test_edge_integration.py");

        let selector = TestSelector::new(&project);
        let targets = selector.select(&change("edge/controllers/pump.py", ProjectArea::Edge, false));

        let paths: Vec<&str> = targets.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "tests/unit/test_edge_controllers.py",
                "tests/integration/test_edge_integration.py",
            ]
        );
    }

    #[test]
    fn test_missing_suites_are_dropped() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        write_suite(&project.root, "tests/integration/test_edge_integration.py");

        let selector = TestSelector::new(&project);
        let targets = selector.select(&change("edge/sensors.py", ProjectArea::Edge, false));

        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0].path,
            Utf8Path::new("tests/integration/test_edge_integration.py")
        );
    }

    #[test]
    fn test_unmapped_area_falls_back_to_default_suite() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        write_suite(&project.root, DEFAULT_SUITE);

        let selector = TestSelector::new(&project);
        let targets = selector.select(&change("docs/notes.py", ProjectArea::Other, false));

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].path, Utf8Path::new(DEFAULT_SUITE));
    }

    #[test]
    fn test_nothing_on_disk_selects_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);

        let selector = TestSelector::new(&project);
        let targets = selector.select(&change("shared/models.py", ProjectArea::Shared, false));

        assert!(targets.is_empty());
    }
}
