//! The physical world of the Carrotfield simulation.
//!
//! This crate models the shared state that every actor task reads and
//! mutates concurrently: a fixed square grid of resource cells and the
//! registry of actors currently on it.
//!
//! # Modules
//!
//! - [`cell`] -- [`Cell`], a lock-free growth state machine.
//! - [`error`] -- Error types for grid construction and addressing.
//! - [`grid`] -- [`Grid`], the cell array plus spatial queries.
//! - [`occupant`] -- [`Occupant`], the view of an actor the grid needs.
//! - [`registry`] -- [`ActorRegistry`], a copy-on-write actor list.

pub mod cell;
pub mod error;
pub mod grid;
pub mod occupant;
pub mod registry;

pub use cell::{Cell, CellSnapshot, MAX_GROWTH};
pub use error::WorldError;
pub use grid::{ActorCensus, CellCensus, Grid, GridView};
pub use occupant::Occupant;
pub use registry::ActorRegistry;
