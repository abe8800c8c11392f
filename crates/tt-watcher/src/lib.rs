//! File change detection, classification, and debouncing.
//!
//! This crate provides the front half of the test-trigger pipeline: raw
//! file events from the `notify` crate are bridged to an async tokio
//! context, classified against the project layout, and debounced per path
//! so that a burst of saves produces a single actionable change.
//!
//! # Overview
//!
//! The tt-watcher crate is designed to:
//!
//! - Detect file changes across the project's monitored directories
//! - Drop ignored paths (caches, virtualenvs, build artifacts) at the source
//! - Classify surviving paths by project area and test-file status
//! - Debounce rapid changes per path with a 2s window, keeping the most
//!   recent event kind
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Blocking Thread (spawn_blocking)             │
//! │  ┌──────────────────┐    ┌──────────────┐    ┌──────────────┐  │
//! │  │ RecommendedWatcher│ -> │ kind mapping │ -> │ ignore filter│  │
//! │  │ (notify, N roots) │    │              │    │ (Classify)   │  │
//! │  └──────────────────┘    └──────────────┘    └──────┬───────┘  │
//! └──────────────────────────────────────────────────────│─────────┘
//!                                          blocking_send │
//!                                                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌────────────────┐                     │
//! │  │ FileWatcher      │ -> │ Debouncer      │ -> engine loop      │
//! │  │ (RawEvent)       │    │ (ChangedPath)  │                     │
//! │  └──────────────────┘    └────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ## Basic File Watching
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use camino::Utf8PathBuf;
//! use tokio::sync::mpsc;
//! use tt_core::WatchConfig;
//! use tt_watcher::{Debouncer, FileWatcher, SourceClassifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WatchConfig::default(); // 2s debounce, recursive
//!     let classifier = Arc::new(SourceClassifier::new());
//!     let roots = vec![Utf8PathBuf::from("shared"), Utf8PathBuf::from("tests")];
//!
//!     let mut watcher = FileWatcher::new(&roots, &config, Arc::clone(&classifier)).await?;
//!
//!     let (tx, mut changes) = mpsc::channel(100);
//!     let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms), classifier, tx);
//!
//!     loop {
//!         tokio::select! {
//!             Some(raw) = watcher.recv() => {
//!                 debouncer.notify(raw.path, raw.kind);
//!             }
//!             Some(change) = changes.recv() => {
//!                 println!("{}", change.describe());
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! ## Classification
//!
//! ```
//! use camino::Utf8Path;
//! use tt_core::ProjectArea;
//! use tt_watcher::{Classify, SourceClassifier};
//!
//! let classifier = SourceClassifier::new();
//!
//! assert!(classifier.should_ignore(Utf8Path::new("shared/__pycache__/m.pyc")));
//! assert_eq!(
//!     classifier.area_of(Utf8Path::new("edge/controllers/pump.py")),
//!     ProjectArea::Edge,
//! );
//! assert!(classifier.is_test_file(Utf8Path::new("tests/unit/test_models.py")));
//! ```
//!
//! # Error Handling
//!
//! The crate uses [`WatchError`] for all error cases. Every variant is
//! fatal to the watching session; per-event problems are logged and
//! skipped inside the watcher loop instead.
//!
//! # Performance Considerations
//!
//! - **Filtering at Source**: Ignore rules run in the blocking thread
//!   before events cross the channel, so cache churn never reaches the
//!   async side.
//!
//! - **Per-Path Debouncing**: Each path carries its own timer; a noisy
//!   file cannot delay tests for an unrelated one.
//!
//! - **Bounded Channel**: The raw event channel has a capacity of 100
//!   events by default, preventing unbounded memory growth if the
//!   consumer is slow.
//!
//! - **UTF-8 Paths**: All paths are validated as UTF-8 early, avoiding
//!   repeated conversion overhead and ensuring consistent path handling.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod classify;
pub mod debounce;
pub mod error;
pub mod events;
pub mod watcher;

// Re-export error types
pub use error::WatchError;

// Re-export event types
pub use events::{ChangedPath, RawEvent};

// Re-export classifier types
pub use classify::{Classify, SourceClassifier};

// Re-export debouncer and watcher types
pub use debounce::Debouncer;
pub use watcher::FileWatcher;
