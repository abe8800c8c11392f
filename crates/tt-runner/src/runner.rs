//! Spawns pytest and captures its output under a time limit.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;

use tt_core::{ProjectArea, ProjectConfig, RunnerConfig};

use crate::error::RunError;

/// Captured output of one test process.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Process exit code; `None` when killed by a signal or a timeout.
    pub exit_code: Option<i32>,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
    /// Whether the process was killed for exceeding the time limit.
    pub timed_out: bool,
    /// Where the JSON report was asked to be written.
    pub report_path: Utf8PathBuf,
    /// When the process was spawned.
    pub started: SystemTime,
    /// Wall-clock time from spawn to exit (or kill).
    pub duration: Duration,
}

/// Runs test suites as child processes.
///
/// Each run invokes the configured program (`python -m pytest` by
/// default) from the project root with a JSON report flag pair, verbose
/// short-traceback output, and optional coverage flags for the project's
/// source areas. Runs are bounded by the configured timeout; an overrun
/// kills the child rather than waiting it out.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    base_args: Vec<String>,
    root: Utf8PathBuf,
    reports_dir: Utf8PathBuf,
    timeout: Duration,
    with_coverage: bool,
    coverage_dirs: Vec<String>,
    /// Keeps report names unique when two runs share a millisecond.
    report_seq: Arc<AtomicU64>,
}

impl ProcessRunner {
    /// Creates a runner for the given project, creating the reports
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ReportsDir`] when the reports directory cannot
    /// be created.
    pub async fn new(project: &ProjectConfig, config: &RunnerConfig) -> Result<Self, RunError> {
        let reports_dir = project.root.join(&config.reports_dir);
        tokio::fs::create_dir_all(reports_dir.as_std_path())
            .await
            .map_err(|source| RunError::ReportsDir {
                path: reports_dir.clone(),
                source,
            })?;

        // Coverage is collected for the source areas only, not the test
        // or script directories.
        let coverage_dirs = project
            .monitored_dirs
            .iter()
            .filter(|dir| {
                matches!(
                    ProjectArea::from_segment(dir),
                    Some(ProjectArea::Shared | ProjectArea::Edge | ProjectArea::Cloud)
                )
            })
            .filter(|dir| project.root.join(dir.as_str()).is_dir())
            .cloned()
            .collect();

        Ok(Self {
            program: config.program.clone(),
            base_args: config.base_args.clone(),
            root: project.root.clone(),
            reports_dir,
            timeout: Duration::from_secs(config.timeout_secs),
            with_coverage: config.with_coverage,
            coverage_dirs,
            report_seq: Arc::new(AtomicU64::new(0)),
        })
    }

    /// The configured time limit for a single run.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether coverage flags are passed to the test process.
    #[must_use]
    pub fn with_coverage(&self) -> bool {
        self.with_coverage
    }

    /// Overrides the coverage setting, e.g. from a CLI flag.
    pub fn set_coverage(&mut self, enabled: bool) {
        self.with_coverage = enabled;
    }

    fn next_report_path(&self) -> Utf8PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let seq = self.report_seq.fetch_add(1, Ordering::Relaxed);
        self.reports_dir
            .join(format!("pytest_report_{millis}_{seq}.json"))
    }

    /// The full argument list for a run, `program` excluded.
    fn build_args(&self, target: Option<&Utf8Path>, report_path: &Utf8Path) -> Vec<String> {
        let mut args = self.base_args.clone();

        if let Some(target) = target {
            args.push(target.to_string());
        }

        if self.with_coverage {
            for dir in &self.coverage_dirs {
                args.push(format!("--cov={dir}"));
            }
            args.push("--cov-report=json".to_owned());
            args.push("--cov-report=term".to_owned());
        }

        args.push("--json-report".to_owned());
        args.push(format!("--json-report-file={report_path}"));
        args.push("-v".to_owned());
        args.push("--tb=short".to_owned());

        args
    }

    /// Runs `target` (or the full suite when `None`) to completion or
    /// until the time limit.
    ///
    /// A timeout kills the child and yields `timed_out = true` with no
    /// exit code; it is not an `Err`. Spawn failures are.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Spawn`] when the program cannot be launched
    /// and [`RunError::Io`] for failures while collecting its output.
    pub async fn run(&self, target: Option<&Utf8Path>) -> Result<RunOutput, RunError> {
        let report_path = self.next_report_path();
        let args = self.build_args(target, &report_path);

        tracing::debug!(
            program = %self.program,
            ?args,
            root = %self.root,
            "Launching test process"
        );

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .current_dir(self.root.as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = SystemTime::now();
        let begin = Instant::now();

        let child = command.spawn().map_err(|source| RunError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(RunOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    timed_out: false,
                    report_path,
                    started,
                    duration: begin.elapsed(),
                })
            }
            Err(_elapsed) => {
                // Dropping the wait future kills the child (kill_on_drop).
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    target = ?target,
                    "Test process exceeded time limit, killed"
                );
                Ok(RunOutput {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                    report_path,
                    started,
                    duration: self.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_in(dir: &TempDir) -> ProjectConfig {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        ProjectConfig {
            root,
            ..ProjectConfig::default()
        }
    }

    #[tokio::test]
    async fn test_new_creates_reports_dir() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        let config = RunnerConfig::default();

        let runner = ProcessRunner::new(&project, &config)
            .await
            .expect("create runner");

        assert!(project.root.join(&config.reports_dir).is_dir());
        assert_eq!(runner.timeout(), Duration::from_secs(config.timeout_secs));
    }

    #[tokio::test]
    async fn test_build_args_shape() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);
        std::fs::create_dir_all(project.root.join("shared").as_std_path()).expect("mkdir");

        let runner = ProcessRunner::new(&project, &RunnerConfig::default())
            .await
            .expect("create runner");

        let report = Utf8PathBuf::from("reports/pytest/pytest_report_1_0.json");
        let args = runner.build_args(Some(Utf8Path::new("tests/unit/test_models.py")), &report);

        assert_eq!(args[0], "-m");
        assert_eq!(args[1], "pytest");
        assert_eq!(args[2], "tests/unit/test_models.py");
        assert!(args.contains(&"--cov=shared".to_owned()));
        assert!(args.contains(&"--cov-report=json".to_owned()));
        assert!(args.contains(&format!("--json-report-file={report}")));
        assert_eq!(args[args.len() - 2], "-v");
        assert_eq!(args[args.len() - 1], "--tb=short");
    }

    #[tokio::test]
    async fn test_build_args_without_coverage() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);

        let config = RunnerConfig {
            with_coverage: false,
            ..RunnerConfig::default()
        };
        let runner = ProcessRunner::new(&project, &config)
            .await
            .expect("create runner");

        let report = Utf8PathBuf::from("r.json");
        let args = runner.build_args(None, &report);

        assert!(!args.iter().any(|a| a.starts_with("--cov")));
    }

    #[tokio::test]
    async fn test_report_paths_are_unique() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);

        let runner = ProcessRunner::new(&project, &RunnerConfig::default())
            .await
            .expect("create runner");

        let a = runner.next_report_path();
        let b = runner.next_report_path();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);

        let config = RunnerConfig {
            program: "definitely-not-a-real-program-xyz".to_owned(),
            ..RunnerConfig::default()
        };
        let runner = ProcessRunner::new(&project, &config)
            .await
            .expect("create runner");

        let result = runner.run(None).await;
        match result {
            Err(RunError::Spawn { program, .. }) => {
                assert_eq!(program, "definitely-not-a-real-program-xyz");
            }
            other => panic!("Expected Spawn error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);

        // Use a shell echo instead of pytest so the test has no Python
        // dependency.
        let config = RunnerConfig {
            program: "sh".to_owned(),
            base_args: vec!["-c".to_owned(), "echo run-output-marker".to_owned()],
            ..RunnerConfig::default()
        };
        let runner = ProcessRunner::new(&project, &config)
            .await
            .expect("create runner");

        let output = runner.run(None).await.expect("run");
        assert_eq!(output.exit_code, Some(0));
        assert!(!output.timed_out);
        assert!(output.stdout.contains("run-output-marker"));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = TempDir::new().expect("temp dir");
        let project = project_in(&dir);

        let config = RunnerConfig {
            program: "sh".to_owned(),
            base_args: vec!["-c".to_owned(), "sleep 30".to_owned()],
            timeout_secs: 1,
            ..RunnerConfig::default()
        };
        let runner = ProcessRunner::new(&project, &config)
            .await
            .expect("create runner");

        let output = runner.run(None).await.expect("run");
        assert!(output.timed_out);
        assert_eq!(output.exit_code, None);
        assert_eq!(output.duration, Duration::from_secs(1));
    }
}
