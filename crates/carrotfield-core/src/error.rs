//! Error type for controller operations.

use carrotfield_world::WorldError;

use crate::config::ConfigError;
use crate::snapshot::PersistenceError;

/// Errors surfaced synchronously by [`Simulation`](crate::Simulation).
///
/// Nothing that happens inside an actor task is reported here; actor
/// loops have no failure path besides being stopped.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The supplied configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The grid could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Saving or loading cell state failed.
    #[error("persistence error: {source}")]
    Persistence {
        /// The underlying persistence error.
        #[from]
        source: PersistenceError,
    },

    /// The operation is only allowed between runs.
    #[error("simulation is running; stop it first")]
    Running,
}
