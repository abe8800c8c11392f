//! Parses pytest JSON reports into [`TestResult`]s.

use std::time::Duration;

use camino::Utf8Path;
use serde::Deserialize;

use crate::result::{ExecutionError, TestResult};
use crate::runner::RunOutput;

/// Cap on the number of failure excerpts kept on a result.
pub const MAX_FAILURE_DETAILS: usize = 5;

/// On-disk shape of a `pytest-json-report` file, reduced to the fields
/// the pipeline reads.
#[derive(Debug, Default, Deserialize)]
struct PytestReport {
    #[serde(default)]
    summary: Summary,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    tests: Vec<CaseReport>,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    passed: u64,
    #[serde(default)]
    failed: u64,
    #[serde(default)]
    skipped: u64,
    #[serde(default)]
    error: u64,
}

#[derive(Debug, Deserialize)]
struct CaseReport {
    nodeid: String,
    outcome: String,
    #[serde(default)]
    call: Option<CallPhase>,
}

#[derive(Debug, Default, Deserialize)]
struct CallPhase {
    #[serde(default)]
    longrepr: Option<String>,
}

/// Finds the percentage on the last coverage `TOTAL` line, if any.
///
/// Coverage's terminal report ends with a line like
/// `TOTAL    1234    56    95%`; scanning keeps the last match so a
/// stray earlier `TOTAL` cannot win.
fn scan_coverage(text: &str) -> Option<f64> {
    let mut found = None;
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("TOTAL") {
            continue;
        }
        if let Some(percent) = parts.last().and_then(|tok| tok.strip_suffix('%')) {
            if let Ok(value) = percent.parse::<f64>() {
                found = Some(value);
            }
        }
    }
    found
}

/// Turns raw process output into a [`TestResult`].
///
/// Parsing never fails: a missing or malformed report degrades to a
/// result carrying [`ExecutionError::ParseError`] with the exit code as
/// the only success signal, and a timed-out run degrades to
/// [`ExecutionError::Timeout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultParser;

impl ResultParser {
    /// Creates a parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the result for `output`, reading its JSON report from disk.
    pub async fn parse(
        &self,
        output: &RunOutput,
        target: Option<&Utf8Path>,
        trigger: Option<&str>,
    ) -> TestResult {
        let mut result = TestResult {
            target: target.map(Utf8Path::to_owned),
            trigger: trigger.map(str::to_owned),
            timestamp: output.started,
            success: false,
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            errors: 0,
            duration: output.duration,
            coverage_percent: None,
            failure_details: Vec::new(),
            execution_error: None,
            report_path: Some(output.report_path.clone()),
        };

        if output.timed_out {
            result.execution_error = Some(ExecutionError::Timeout);
            result.failure_details.push(format!(
                "test run exceeded the {}s time limit and was killed",
                output.duration.as_secs()
            ));
            return result;
        }

        result.coverage_percent =
            scan_coverage(&output.stdout).or_else(|| scan_coverage(&output.stderr));

        let report = match tokio::fs::read_to_string(output.report_path.as_std_path()).await {
            Ok(text) => match serde_json::from_str::<PytestReport>(&text) {
                Ok(report) => report,
                Err(error) => {
                    tracing::warn!(
                        path = %output.report_path,
                        error = %error,
                        "Malformed pytest JSON report"
                    );
                    return self.degrade(result, output, "report was not valid JSON");
                }
            },
            Err(error) => {
                tracing::warn!(
                    path = %output.report_path,
                    error = %error,
                    "Missing or unreadable pytest JSON report"
                );
                return self.degrade_missing(result, output);
            }
        };

        result.total = report.summary.total;
        result.passed = report.summary.passed;
        result.failed = report.summary.failed;
        result.skipped = report.summary.skipped;
        result.errors = report.summary.error;
        result.success =
            report.summary.failed == 0 && report.summary.error == 0 && output.exit_code == Some(0);

        if report.duration.is_finite() && report.duration >= 0.0 {
            result.duration = Duration::from_secs_f64(report.duration);
        }

        for case in &report.tests {
            if result.failure_details.len() >= MAX_FAILURE_DETAILS {
                break;
            }
            if case.outcome != "failed" && case.outcome != "error" {
                continue;
            }
            let message = case
                .call
                .as_ref()
                .and_then(|phase| phase.longrepr.as_deref())
                .and_then(|repr| repr.lines().next())
                .unwrap_or("no failure output captured");
            result
                .failure_details
                .push(format!("{}: {}", case.nodeid, message));
        }

        result
    }

    fn degrade_missing(&self, result: TestResult, output: &RunOutput) -> TestResult {
        self.degrade(result, output, "report file missing or unreadable")
    }

    fn degrade(&self, mut result: TestResult, output: &RunOutput, reason: &str) -> TestResult {
        result.success = output.exit_code == Some(0);
        result.execution_error = Some(ExecutionError::ParseError);
        result
            .failure_details
            .push(format!("counts unavailable: {reason}"));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn output_with_report(dir: &TempDir, report_json: &str) -> RunOutput {
        let report_path = Utf8PathBuf::from_path_buf(dir.path().join("report.json"))
            .expect("utf-8 temp dir");
        std::fs::write(report_path.as_std_path(), report_json).expect("write report");
        RunOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            report_path,
            started: SystemTime::now(),
            duration: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_happy_path_counts() {
        let dir = TempDir::new().expect("temp dir");
        let output = output_with_report(
            &dir,
            r#"{
                "summary": {"total": 4, "passed": 3, "failed": 0, "skipped": 1},
                "duration": 1.5,
                "tests": []
            }"#,
        );

        let result = ResultParser::new()
            .parse(&output, Some(Utf8Path::new("tests/unit/test_models.py")), None)
            .await;

        assert!(result.success);
        assert!(result.counts_trusted());
        assert_eq!(result.total, 4);
        assert_eq!(result.passed, 3);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 0);
        assert_eq!(result.duration, Duration::from_secs_f64(1.5));
    }

    #[tokio::test]
    async fn test_failures_capture_details_capped() {
        let dir = TempDir::new().expect("temp dir");
        let cases: Vec<String> = (0..8)
            .map(|i| {
                format!(
                    r#"{{"nodeid": "tests/t.py::test_{i}", "outcome": "failed",
                        "call": {{"longrepr": "AssertionError: boom {i}\nmore"}}}}"#
                )
            })
            .collect();
        let json = format!(
            r#"{{"summary": {{"total": 8, "passed": 0, "failed": 8, "skipped": 0}},
                "duration": 0.5, "tests": [{}]}}"#,
            cases.join(",")
        );
        let mut output = output_with_report(&dir, &json);
        output.exit_code = Some(1);

        let result = ResultParser::new().parse(&output, None, None).await;

        assert!(!result.success);
        assert_eq!(result.failed, 8);
        assert_eq!(result.failure_details.len(), MAX_FAILURE_DETAILS);
        assert!(result.failure_details[0].contains("test_0"));
        assert!(result.failure_details[0].contains("AssertionError: boom 0"));
        assert!(!result.failure_details[0].contains("more"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_defeats_green_counts() {
        let dir = TempDir::new().expect("temp dir");
        let mut output = output_with_report(
            &dir,
            r#"{"summary": {"total": 1, "passed": 1, "failed": 0, "skipped": 0},
               "duration": 0.1, "tests": []}"#,
        );
        output.exit_code = Some(2);

        let result = ResultParser::new().parse(&output, None, None).await;
        assert!(!result.success);
        assert!(result.counts_trusted());
    }

    #[tokio::test]
    async fn test_missing_report_degrades() {
        let output = RunOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            report_path: Utf8PathBuf::from("/nonexistent/report.json"),
            started: SystemTime::now(),
            duration: Duration::from_secs(1),
        };

        let result = ResultParser::new().parse(&output, None, None).await;

        assert_eq!(result.execution_error, Some(ExecutionError::ParseError));
        assert!(result.success);
        assert!(!result.counts_trusted());
        assert_eq!(result.total, 0);
        assert_eq!(result.failure_details.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_report_degrades_with_exit_code() {
        let dir = TempDir::new().expect("temp dir");
        let mut output = output_with_report(&dir, "not json at all");
        output.exit_code = Some(1);

        let result = ResultParser::new().parse(&output, None, None).await;

        assert_eq!(result.execution_error, Some(ExecutionError::ParseError));
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_timeout_shape() {
        let output = RunOutput {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
            report_path: Utf8PathBuf::from("unused.json"),
            started: SystemTime::now(),
            duration: Duration::from_secs(300),
        };

        let result = ResultParser::new().parse(&output, None, None).await;

        assert_eq!(result.execution_error, Some(ExecutionError::Timeout));
        assert!(!result.success);
        assert_eq!(result.duration, Duration::from_secs(300));
        assert_eq!(result.total, 0);
        assert!(result.failure_details[0].contains("time limit"));
    }

    #[tokio::test]
    async fn test_coverage_from_stdout() {
        let dir = TempDir::new().expect("temp dir");
        let mut output = output_with_report(
            &dir,
            r#"{"summary": {"total": 1, "passed": 1, "failed": 0, "skipped": 0},
               "duration": 0.1, "tests": []}"#,
        );
        output.stdout =
            "shared/models.py    120    6    95%\nTOTAL    450    23    94%\n".to_owned();

        let result = ResultParser::new().parse(&output, None, None).await;
        assert_eq!(result.coverage_percent, Some(94.0));
    }

    #[test]
    fn test_scan_coverage_last_total_wins() {
        let text = "TOTAL 10 5 50%\nmodule 1 0 100%\nTOTAL 10 1 90%\n";
        assert_eq!(scan_coverage(text), Some(90.0));
    }

    #[test]
    fn test_scan_coverage_ignores_malformed_lines() {
        assert_eq!(scan_coverage("TOTAL\nTOTAL 10 1 notapercent\n"), None);
        assert_eq!(scan_coverage(""), None);
    }
}
