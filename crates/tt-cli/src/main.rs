//! CLI entry point for the tt-watch test trigger.
//!
//! This binary watches a Python project for source changes and runs the
//! mapped pytest suites automatically, serialized through a single run
//! queue.
//!
//! # Usage
//!
//! ```bash
//! tt-watch [OPTIONS] <COMMAND>
//!
//! # Watch the project in the current directory
//! tt-watch watch
//!
//! # Watch with a 500ms debounce window and no coverage
//! tt-watch watch --debounce 500 --no-coverage
//!
//! # Run one suite immediately
//! tt-watch run tests/unit/test_foundational_models.py
//!
//! # Validate the project layout without watching
//! tt-watch check
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tt_core::Config;
use tt_engine::{Orchestrator, ResultSink, StatsSnapshot};
use tt_runner::{ProcessRunner, ResultParser, TestResult};
use tt_watcher::ChangedPath;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Maximum failure excerpts rendered per result.
const MAX_RENDERED_FAILURES: usize = 3;

/// Maximum characters of a rendered failure excerpt.
const MAX_FAILURE_WIDTH: usize = 100;

/// Automatic test trigger for Python projects.
///
/// Watches the project's source directories and runs the pytest suites
/// mapped to whatever changed, one run at a time.
#[derive(Parser)]
#[command(name = "tt-watch", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to the project root.
    ///
    /// Defaults to the current directory if not specified.
    #[arg(short, long, global = true, env = "TT_WATCH_PATH")]
    path: Option<Utf8PathBuf>,

    /// Path to a JSON configuration file.
    #[arg(short, long, global = true, env = "TT_WATCH_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Watch the project and run mapped suites on change.
    Watch {
        /// Debounce window in milliseconds.
        #[arg(long)]
        debounce: Option<u64>,

        /// Run tests without coverage collection.
        #[arg(long)]
        no_coverage: bool,

        /// Watch and count changes without triggering any runs.
        #[arg(long)]
        no_auto_tests: bool,
    },

    /// Run one suite immediately and exit with its status.
    Run {
        /// Suite path relative to the project root.
        target: Utf8PathBuf,

        /// Run without coverage collection.
        #[arg(long)]
        no_coverage: bool,
    },

    /// Validate the project layout and list the watched directories.
    Check,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// Noisy crates like `hyper`, `mio`, and `notify` are filtered to `warn`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,mio=warn,notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the configuration file and CLI arguments.
///
/// CLI flags win over the file, which wins over the defaults.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be read or the
/// project root is not a directory.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load {}: {}", path, e))?,
        None => Config::default(),
    };

    if let Some(path) = &cli.path {
        config.project.root.clone_from(path);
    }
    if config.project.root.as_str().is_empty() {
        config.project.root = Utf8PathBuf::from(".");
    }

    if !config.project.root.is_dir() {
        return Err(color_eyre::eyre::eyre!(
            "Project root is not a directory: {}",
            config.project.root
        ));
    }

    Ok(config)
}

// =============================================================================
// CONSOLE SINK
// =============================================================================

/// Renders engine output to stdout.
struct ConsoleSink;

impl ConsoleSink {
    fn render_result(handle: &mut impl Write, result: &TestResult) {
        let _ = writeln!(handle);
        let _ = writeln!(
            handle,
            "[{}] {} ({:.1}s)",
            result.status_label(),
            result.target_label(),
            result.duration.as_secs_f64()
        );
        if let Some(trigger) = &result.trigger {
            let _ = writeln!(handle, "  triggered by: {trigger}");
        }
        if result.counts_trusted() {
            let _ = writeln!(
                handle,
                "  {} passed, {} failed, {} skipped, {} errors",
                result.passed, result.failed, result.skipped, result.errors
            );
        }
        if let Some(coverage) = result.coverage_percent {
            let _ = writeln!(handle, "  coverage: {coverage:.1}%");
        }
        for detail in result.failure_details.iter().take(MAX_RENDERED_FAILURES) {
            let _ = writeln!(handle, "  - {}", truncate(detail, MAX_FAILURE_WIDTH));
        }
    }

    fn render_stats(handle: &mut impl Write, stats: &StatsSnapshot) {
        let _ = writeln!(handle);
        let _ = writeln!(handle, "Session Statistics");
        let _ = writeln!(handle, "==================");
        let _ = writeln!(handle, "Events detected:  {}", stats.events_detected);
        let _ = writeln!(handle, "Events processed: {}", stats.events_processed);
        let _ = writeln!(handle, "Runs executed:    {}", stats.tests_executed);
        let _ = writeln!(handle, "  Passed:         {}", stats.tests_passed);
        let _ = writeln!(handle, "  Failed:         {}", stats.tests_failed);
        let _ = writeln!(handle, "Success rate:     {:.1}%", stats.success_rate());
    }
}

impl ResultSink for ConsoleSink {
    fn on_change(&self, change: &ChangedPath) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "* {}", change.describe());
    }

    fn on_result(&self, result: &TestResult) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        Self::render_result(&mut handle, result);
    }

    fn on_stats(&self, stats: &StatsSnapshot) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        Self::render_stats(&mut handle, stats);
    }
}

/// Truncates a string to at most `width` characters.
fn truncate(s: &str, width: usize) -> std::borrow::Cow<'_, str> {
    if s.chars().count() <= width {
        return std::borrow::Cow::Borrowed(s);
    }
    let cut: String = s.chars().take(width.saturating_sub(3)).collect();
    std::borrow::Cow::Owned(format!("{cut}..."))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the watch session until ctrl-c (or SIGTERM on Unix).
async fn run_watch(
    config: Config,
    debounce: Option<u64>,
    no_coverage: bool,
    no_auto_tests: bool,
) -> color_eyre::Result<ExitCode> {
    let mut config = config;
    if let Some(ms) = debounce {
        config.watch.debounce_ms = ms;
    }
    if no_coverage {
        config.runner.with_coverage = false;
    }

    info!(
        root = %config.project.root,
        debounce_ms = config.watch.debounce_ms,
        coverage = config.runner.with_coverage,
        auto_tests = !no_auto_tests,
        "Starting tt-watch"
    );

    let mut orchestrator = Orchestrator::new(config, ConsoleSink);
    orchestrator.set_auto_tests(!no_auto_tests);

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(wait_for_shutdown_signal(stop_tx));

    orchestrator
        .run(stop_rx)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Watch session failed: {e}"))?;

    Ok(ExitCode::SUCCESS)
}

/// Resolves when ctrl-c (or SIGTERM on Unix) arrives, then fires `stop`.
async fn wait_for_shutdown_signal(stop: oneshot::Sender<()>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received ctrl-c, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received ctrl-c, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received ctrl-c, shutting down");
    }

    let _ = stop.send(());
}

/// Runs one suite immediately, mirroring its status in the exit code.
async fn run_once(
    config: Config,
    target: &Utf8Path,
    no_coverage: bool,
) -> color_eyre::Result<ExitCode> {
    config
        .project
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Project validation failed: {e}"))?;

    let mut runner = ProcessRunner::new(&config.project, &config.runner).await?;
    if no_coverage {
        runner.set_coverage(false);
    }

    info!(suite = %target, "Running suite");
    let output = runner.run(Some(target)).await?;
    let result = ResultParser::new().parse(&output, Some(target), None).await;

    let sink = ConsoleSink;
    sink.on_result(&result);

    if result.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Validates the project layout and lists what would be watched.
fn run_check(config: &Config) -> color_eyre::Result<ExitCode> {
    config
        .project
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Project validation failed: {e}"))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle, "Project root: {}", config.project.root);
    let _ = writeln!(handle, "Marker file:  {}", config.project.marker_file);
    let _ = writeln!(handle, "Watched directories:");
    for dir in config.project.existing_monitored_dirs() {
        let _ = writeln!(handle, "  {dir}");
    }
    let _ = writeln!(handle, "Project layout is valid.");

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to the appropriate command
    let config = build_config(&cli)?;
    match &cli.command {
        Commands::Watch {
            debounce,
            no_coverage,
            no_auto_tests,
        } => run_watch(config, *debounce, *no_coverage, *no_auto_tests).await,
        Commands::Run { target, no_coverage } => run_once(config, target, *no_coverage).await,
        Commands::Check => run_check(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_strings_untouched() {
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn test_truncate_caps_width() {
        let long = "x".repeat(250);
        let cut = truncate(&long, 100);
        assert_eq!(cut.chars().count(), 100);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_cli_parses_watch_flags() {
        let cli = Cli::parse_from([
            "tt-watch",
            "watch",
            "--debounce",
            "500",
            "--no-coverage",
            "--no-auto-tests",
        ]);
        match cli.command {
            Commands::Watch {
                debounce,
                no_coverage,
                no_auto_tests,
            } => {
                assert_eq!(debounce, Some(500));
                assert!(no_coverage);
                assert!(no_auto_tests);
            }
            _ => panic!("expected watch subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_run_target() {
        let cli = Cli::parse_from(["tt-watch", "run", "tests/unit/test_models.py"]);
        match cli.command {
            Commands::Run { target, .. } => {
                assert_eq!(target, Utf8PathBuf::from("tests/unit/test_models.py"));
            }
            _ => panic!("expected run subcommand"),
        }
    }
}
