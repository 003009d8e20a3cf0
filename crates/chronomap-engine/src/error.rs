//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the timeline run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: chronomap_core::config::ConfigError,
    },

    /// The timeline driver refused to start.
    #[error("driver error: {source}")]
    Driver {
        /// The underlying driver error.
        #[from]
        source: chronomap_core::driver::DriverError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: chronomap_observer::startup::StartupError,
    },
}
