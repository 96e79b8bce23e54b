//! The view of an actor that the grid needs for spatial queries.
//!
//! The grid indexes actors but never drives them, so it only depends on
//! this trait. The agents crate implements it for its concrete actor type.

use carrotfield_types::{ActorId, ActorKind, Position};

/// Something that can stand on the grid.
pub trait Occupant: Send + Sync {
    /// Stable identity.
    fn id(&self) -> ActorId;

    /// Which capability set this occupant has.
    fn kind(&self) -> ActorKind;

    /// Current cell, read atomically.
    fn position(&self) -> Position;

    /// Whether the occupant still participates in the simulation.
    fn is_active(&self) -> bool;
}
