//! Enumeration types for the Carrotfield simulation.

use serde::{Deserialize, Serialize};

/// Growth state of a single grid cell.
///
/// A cell starts [`Empty`](Self::Empty), becomes [`Growing`](Self::Growing)
/// when planted, turns [`Ready`](Self::Ready) after enough growth ticks, and
/// is left [`Damaged`](Self::Damaged) when a consumer eats it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    /// Bare soil, ready to be planted.
    #[default]
    Empty,
    /// Planted and maturing; the growth stage is meaningful.
    Growing,
    /// Fully grown and edible.
    Ready,
    /// Eaten down; must be repaired before replanting is useful.
    Damaged,
}

impl CellState {
    /// All states in declaration order.
    pub const ALL: [Self; 4] = [Self::Empty, Self::Growing, Self::Ready, Self::Damaged];
}

impl core::fmt::Display for CellState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Growing => "growing",
            Self::Ready => "ready",
            Self::Damaged => "damaged",
        };
        f.write_str(name)
    }
}

/// The closed set of actor kinds.
///
/// Code that needs kind-specific behaviour matches on this tag rather than
/// inspecting concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Plants empty cells and repairs damaged ones (the farmer).
    Producer,
    /// Eats ready cells until its appetite is exhausted (the rabbit).
    Consumer,
    /// Chases consumers on behalf of its producer (the dog).
    Protector,
}

impl core::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
            Self::Protector => "protector",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cell_state_serializes_snake_case() {
        let json = serde_json::to_string(&CellState::Growing).unwrap();
        assert_eq!(json, "\"growing\"");
        let back: CellState = serde_json::from_str("\"damaged\"").unwrap();
        assert_eq!(back, CellState::Damaged);
    }

    #[test]
    fn default_cell_state_is_empty() {
        assert_eq!(CellState::default(), CellState::Empty);
    }

    #[test]
    fn actor_kind_display() {
        assert_eq!(ActorKind::Protector.to_string(), "protector");
    }
}
