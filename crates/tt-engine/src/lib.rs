//! Watch orchestration, serialized run queue, and statistics.
//!
//! This crate ties the watcher and the runner into a session: the
//! [`Orchestrator`] validates the project, streams debounced changes,
//! and feeds a single-worker [`RunQueue`] so test runs never overlap.
//! Session counters live in [`RunStats`], and everything a frontend
//! renders arrives through the [`ResultSink`] trait.
//!
//! # Crate layout
//!
//! ```text
//! tt-cli ──► tt-engine ──► tt-runner ──► tt-core
//!                      └─► tt-watcher ──►
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::oneshot;
//! use tt_core::Config;
//! use tt_engine::{Orchestrator, TracingSink};
//!
//! # async fn example() -> Result<(), tt_engine::EngineError> {
//! let orchestrator = Orchestrator::new(Config::default(), TracingSink);
//! let (stop_tx, stop_rx) = oneshot::channel();
//!
//! // Elsewhere: stop_tx.send(()) on ctrl-c.
//! # drop(stop_tx);
//! let snapshot = orchestrator.run(stop_rx).await?;
//! println!("{} runs executed", snapshot.tests_executed);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod queue;
pub mod sink;
pub mod stats;

// Re-export error types
pub use error::EngineError;

// Re-export session types
pub use engine::Orchestrator;
pub use queue::{RunQueue, RunRequest};
pub use sink::{CollectingSink, ResultSink, TracingSink};
pub use stats::{RunStats, StatsSnapshot};
