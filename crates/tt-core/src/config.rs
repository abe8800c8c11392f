//! Configuration structures for the tt-watch tool.
//!
//! This module provides configuration types for all components of the
//! application:
//!
//! - [`ProjectConfig`] - Project layout (root, markers, monitored areas)
//! - [`WatchConfig`] - File watcher settings (debouncing, recursion)
//! - [`RunnerConfig`] - External test-runner settings (command, timeout)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] with the values the
//! drawing-machine project layout expects.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ProjectArea;

/// Configuration of the project layout being watched.
///
/// Controls where the watcher looks for source changes and which marker
/// paths must exist before watching starts.
///
/// # Examples
///
/// ```
/// use tt_core::ProjectConfig;
///
/// let config = ProjectConfig::default();
/// assert_eq!(config.marker_file, "pyproject.toml");
/// assert_eq!(config.monitored_dirs.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root directory of the watched project.
    pub root: Utf8PathBuf,

    /// File that must exist at the root for the project to be valid.
    pub marker_file: String,

    /// Directory names to monitor, relative to the root.
    ///
    /// Only directories that exist are registered with the watcher, but at
    /// least one must exist for startup to succeed.
    pub monitored_dirs: Vec<String>,

    /// Tests directory, relative to the root. Must exist at startup.
    pub tests_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            marker_file: "pyproject.toml".to_owned(),
            monitored_dirs: ProjectArea::RECOGNIZED
                .iter()
                .map(|a| a.label().to_owned())
                .collect(),
            tests_dir: "tests".to_owned(),
        }
    }
}

impl ProjectConfig {
    /// Validates that the required project markers exist.
    ///
    /// Checks, in order: the root is a directory, the marker file exists,
    /// the tests directory exists, and at least one monitored directory
    /// exists. Validation failures are fatal to startup; nothing is
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] or
    /// [`ConfigError::MissingDirectory`] describing the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: self.root.clone(),
                reason: "project root is not a directory".to_owned(),
            });
        }

        let marker = self.root.join(&self.marker_file);
        if !marker.exists() {
            return Err(ConfigError::MissingMarker(marker));
        }

        let tests = self.root.join(&self.tests_dir);
        if !tests.is_dir() {
            return Err(ConfigError::MissingDirectory(tests));
        }

        if self.existing_monitored_dirs().is_empty() {
            return Err(ConfigError::MissingDirectory(
                self.root.join(
                    self.monitored_dirs
                        .first()
                        .map_or("shared", String::as_str),
                ),
            ));
        }

        Ok(())
    }

    /// Returns the monitored directories that exist on disk.
    ///
    /// Missing directories are skipped; the watcher only registers paths
    /// that exist.
    #[must_use]
    pub fn existing_monitored_dirs(&self) -> Vec<Utf8PathBuf> {
        self.monitored_dirs
            .iter()
            .map(|d| self.root.join(d))
            .filter(|p| p.is_dir())
            .collect()
    }
}

/// Configuration for the file watcher and debouncer.
///
/// # Examples
///
/// ```
/// use tt_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 2000);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    ///
    /// Repeated events for the same path within this window collapse into
    /// a single delivery carrying the most recent event kind.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            recursive: true,
        }
    }
}

/// Configuration for the external test-runner process.
///
/// # Examples
///
/// ```
/// use tt_core::RunnerConfig;
///
/// let config = RunnerConfig::default();
/// assert_eq!(config.program, "python");
/// assert_eq!(config.timeout_secs, 300);
/// assert!(config.with_coverage);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Executable to invoke.
    pub program: String,

    /// Leading arguments placed before the target and report flags.
    pub base_args: Vec<String>,

    /// Hard wall-clock timeout for one run, in seconds.
    pub timeout_secs: u64,

    /// Whether to pass coverage instrumentation flags.
    pub with_coverage: bool,

    /// Directory for machine-readable report files, relative to the root.
    pub reports_dir: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "python".to_owned(),
            base_args: vec!["-m".to_owned(), "pytest".to_owned()],
            timeout_secs: 300,
            with_coverage: true,
            reports_dir: "reports/pytest".to_owned(),
        }
    }
}

/// Root configuration for the tt-watch tool.
///
/// Combines all component configurations into a single structure that can
/// be loaded from a JSON file or constructed programmatically.
///
/// # Examples
///
/// ```
/// use tt_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// let parsed: Config = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, parsed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout configuration.
    pub project: ProjectConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,

    /// Test-runner configuration.
    pub runner: RunnerConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read or
    /// [`ConfigError::Parse`] if it is not valid JSON.
    pub fn load(path: &camino::Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_std_path())?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_project_config_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.marker_file, "pyproject.toml");
        assert_eq!(config.tests_dir, "tests");
        assert_eq!(
            config.monitored_dirs,
            vec!["shared", "edge", "cloud", "tests", "scripts"]
        );
    }

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::default();
        assert_eq!(config.debounce_ms, 2000);
        assert!(config.recursive);
    }

    #[test]
    fn test_runner_config_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.program, "python");
        assert_eq!(config.base_args, vec!["-m", "pytest"]);
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.reports_dir, "reports/pytest");
    }

    #[test]
    fn test_validate_accepts_complete_layout() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::fs::write(root.join("pyproject.toml").as_std_path(), "[tool]").unwrap();
        std::fs::create_dir(root.join("tests").as_std_path()).unwrap();
        std::fs::create_dir(root.join("shared").as_std_path()).unwrap();

        let config = ProjectConfig {
            root,
            ..ProjectConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_marker() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::fs::create_dir(root.join("tests").as_std_path()).unwrap();
        std::fs::create_dir(root.join("shared").as_std_path()).unwrap();

        let config = ProjectConfig {
            root,
            ..ProjectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingMarker(_))
        ));
    }

    #[test]
    fn test_validate_rejects_no_watchable_dirs() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::fs::write(root.join("pyproject.toml").as_std_path(), "[tool]").unwrap();
        std::fs::create_dir(root.join("tests").as_std_path()).unwrap();

        let config = ProjectConfig {
            root,
            monitored_dirs: vec!["shared".to_owned(), "edge".to_owned()],
            ..ProjectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_existing_monitored_dirs_filters() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::fs::create_dir(root.join("shared").as_std_path()).unwrap();
        std::fs::create_dir(root.join("cloud").as_std_path()).unwrap();

        let config = ProjectConfig {
            root: root.clone(),
            ..ProjectConfig::default()
        };
        let dirs = config.existing_monitored_dirs();
        assert_eq!(dirs, vec![root.join("shared"), root.join("cloud")]);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"watch": {"debounce_ms": 500}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.watch.debounce_ms, 500);
        // Other fields should have defaults
        assert!(config.watch.recursive);
        assert_eq!(config.runner.timeout_secs, 300);
        assert_eq!(config.project.marker_file, "pyproject.toml");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
