//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or writing failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: carrotfield_core::ConfigError,
    },

    /// The controller rejected an operation.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying controller error.
        #[from]
        source: carrotfield_core::SimulationError,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal handler error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
