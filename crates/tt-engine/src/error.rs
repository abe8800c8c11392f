//! Error types for the tt-engine crate.

/// Errors that can occur while starting or running a watch session.
///
/// Anything that happens after the session reaches its watching state is
/// reported through the sink or logged; only startup problems and a
/// failing event source surface here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The project failed validation before anything was started.
    #[error("project validation failed: {0}")]
    Environment(#[from] tt_core::ConfigError),

    /// The file watcher could not be started or stopped expectedly.
    #[error(transparent)]
    Watch(#[from] tt_watcher::WatchError),

    /// The test runner could not be set up.
    #[error(transparent)]
    Run(#[from] tt_runner::RunError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_environment_display() {
        let err = EngineError::Environment(tt_core::ConfigError::MissingMarker(
            Utf8PathBuf::from("project/pyproject.toml"),
        ));
        assert!(err.to_string().contains("validation failed"));
    }
}
