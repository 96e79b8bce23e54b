//! Shared type definitions for the Carrotfield simulation.
//!
//! Every crate in the workspace speaks in terms of the types defined here:
//! actor identifiers, the cell growth states, actor kinds, and grid
//! positions.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for actor identifiers
//! - [`enums`] -- [`CellState`] and [`ActorKind`]
//! - [`structs`] -- [`Position`] and Chebyshev-distance helpers

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{ActorKind, CellState};
pub use ids::ActorId;
pub use structs::Position;
