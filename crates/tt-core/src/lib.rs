//! Core types, errors, and configuration for the tt-watch tool.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Configuration structures ([`Config`], [`ProjectConfig`], [`WatchConfig`],
//!   [`RunnerConfig`])
//! - Error types for consistent error handling ([`ConfigError`])
//! - Domain enums ([`EventKind`], [`ProjectArea`])
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{Config, ProjectConfig, RunnerConfig, WatchConfig};
pub use error::ConfigError;
pub use hash::{fx_hash_map, fx_hash_set, FxBuildHasher, FxHashMap, FxHashSet};
pub use types::{EventKind, ProjectArea};
