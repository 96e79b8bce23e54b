//! Simulation controller, world tick, and persistence for Carrotfield.
//!
//! This crate owns the grid for a session, launches one Tokio task per
//! actor plus the world-tick task, and tears them all down again on stop.
//! It also validates configuration and saves and restores cell state.
//!
//! # Modules
//!
//! - [`config`] -- [`SimulationConfig`] loading from
//!   `carrotfield-config.yaml`, validation, and write-back.
//! - [`error`] -- [`SimulationError`], the controller's error type.
//! - [`group`] -- [`UnitGroup`], the cancellation-aware set of running
//!   tasks with bounded shutdown.
//! - [`simulation`] -- [`Simulation`], the controller.
//! - [`snapshot`] -- [`GridSnapshot`], the durable per-cell record.
//! - [`tick`] -- The world tick: consumer spawn rolls and cell growth.
//!
//! [`SimulationConfig`]: config::SimulationConfig
//! [`SimulationError`]: error::SimulationError
//! [`UnitGroup`]: group::UnitGroup
//! [`Simulation`]: simulation::Simulation
//! [`GridSnapshot`]: snapshot::GridSnapshot

pub mod config;
pub mod error;
pub mod group;
pub mod simulation;
pub mod snapshot;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use group::{ShutdownReport, UnitGroup, UnitLabel};
pub use simulation::Simulation;
pub use snapshot::{CellRecord, GridSnapshot, PersistenceError};
