//! Result types produced by a test run.

use std::time::{Duration, SystemTime};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Why a run's pass/fail counts cannot be taken at face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ExecutionError {
    /// The test process exceeded its time limit and was killed.
    Timeout,
    /// The JSON report was missing or unreadable after the run.
    ParseError,
    /// Some other execution problem, with a short description.
    Other(String),
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Other(detail) => write!(f, "ERROR: {detail}"),
        }
    }
}

/// The outcome of one test run.
///
/// Built by the [`ResultParser`](crate::report::ResultParser) from the
/// process exit status and the pytest JSON report. When
/// `execution_error` is set the counts are fallback values, not parsed
/// ones; check [`counts_trusted`](Self::counts_trusted) before treating
/// them as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// The suite this run executed; `None` means the full suite.
    pub target: Option<Utf8PathBuf>,

    /// Human-readable description of the change that triggered the run,
    /// when one did.
    pub trigger: Option<String>,

    /// When the run started.
    pub timestamp: SystemTime,

    /// Whether the run is considered green.
    pub success: bool,

    /// Total number of collected tests.
    pub total: u64,
    /// Number of passed tests.
    pub passed: u64,
    /// Number of failed tests.
    pub failed: u64,
    /// Number of skipped tests.
    pub skipped: u64,
    /// Number of tests that errored during setup or teardown.
    pub errors: u64,

    /// Wall-clock duration of the run.
    pub duration: Duration,

    /// Overall coverage percentage, when coverage was collected and a
    /// `TOTAL` line could be found in the output.
    pub coverage_percent: Option<f64>,

    /// Up to [`MAX_FAILURE_DETAILS`](crate::report::MAX_FAILURE_DETAILS)
    /// failure excerpts of the form `nodeid: message`, in report order.
    pub failure_details: Vec<String>,

    /// Set when the run did not produce a trustworthy report.
    pub execution_error: Option<ExecutionError>,

    /// Path to the JSON report, when one was requested.
    pub report_path: Option<Utf8PathBuf>,
}

impl TestResult {
    /// Returns `true` when the pass/fail counts were parsed from a real
    /// report rather than synthesized from an exit code.
    #[must_use]
    pub fn counts_trusted(&self) -> bool {
        self.execution_error.is_none()
    }

    /// A one-word status label for display.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        match (&self.execution_error, self.success) {
            (Some(ExecutionError::Timeout), _) => "TIMEOUT",
            (Some(_), true) => "PASSED",
            (Some(_), false) => "ERROR",
            (None, true) => "PASSED",
            (None, false) => "FAILED",
        }
    }

    /// Name of the executed suite for display, falling back to the whole
    /// suite.
    #[must_use]
    pub fn target_label(&self) -> &str {
        self.target.as_ref().map_or("full suite", |t| t.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_result() -> TestResult {
        TestResult {
            target: Some(Utf8PathBuf::from("tests/unit/test_models.py")),
            trigger: Some("modified shared/models.py".to_owned()),
            timestamp: SystemTime::UNIX_EPOCH,
            success: true,
            total: 3,
            passed: 3,
            failed: 0,
            skipped: 0,
            errors: 0,
            duration: Duration::from_secs_f64(1.25),
            coverage_percent: Some(87.5),
            failure_details: Vec::new(),
            execution_error: None,
            report_path: None,
        }
    }

    #[test]
    fn test_counts_trusted_without_error() {
        assert!(base_result().counts_trusted());
    }

    #[test]
    fn test_counts_untrusted_on_timeout() {
        let mut result = base_result();
        result.execution_error = Some(ExecutionError::Timeout);
        result.success = false;
        assert!(!result.counts_trusted());
        assert_eq!(result.status_label(), "TIMEOUT");
    }

    #[test]
    fn test_status_labels() {
        let mut result = base_result();
        assert_eq!(result.status_label(), "PASSED");

        result.success = false;
        result.failed = 1;
        assert_eq!(result.status_label(), "FAILED");

        result.execution_error = Some(ExecutionError::ParseError);
        assert_eq!(result.status_label(), "ERROR");
    }

    #[test]
    fn test_target_label_falls_back_to_full_suite() {
        let mut result = base_result();
        assert_eq!(result.target_label(), "tests/unit/test_models.py");
        result.target = None;
        assert_eq!(result.target_label(), "full suite");
    }

    #[test]
    fn test_execution_error_display() {
        assert_eq!(ExecutionError::Timeout.to_string(), "TIMEOUT");
        assert_eq!(ExecutionError::ParseError.to_string(), "PARSE_ERROR");
        assert_eq!(
            ExecutionError::Other("venv missing".to_owned()).to_string(),
            "ERROR: venv missing"
        );
    }

    #[test]
    fn test_result_serializes() {
        let json = serde_json::to_string(&base_result()).expect("serialize");
        assert!(json.contains("\"passed\":3"));
        assert!(json.contains("test_models.py"));
    }
}
