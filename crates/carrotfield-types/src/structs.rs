//! Plain data structs shared across the workspace.

use serde::{Deserialize, Serialize};

/// A cell coordinate on the square grid.
///
/// `x` selects the row and `y` the column; both are in `[0, size)` for
/// any position handed out by the grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Row index.
    pub x: u32,
    /// Column index.
    pub y: u32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`.
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Whether `other` lies within Chebyshev distance `range` (inclusive).
    pub const fn within(self, other: Self, range: u32) -> bool {
        self.chebyshev_distance(other) <= range
    }

    /// Offset by a signed step, or `None` if a coordinate would go negative
    /// or overflow. Upper grid bounds are the caller's concern.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add_signed(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add_signed(dy) else {
            return None;
        };
        Some(Self { x, y })
    }

    /// One greedy pursuit step toward `target`: each axis moves by at most
    /// one toward the target and never overshoots.
    pub const fn step_toward(self, target: Self) -> Self {
        Self {
            x: approach(self.x, target.x),
            y: approach(self.y, target.y),
        }
    }

    /// Pack into a single `u64` (`x` in the high half) for atomic storage.
    pub const fn to_bits(self) -> u64 {
        ((self.x as u64) << 32) | self.y as u64
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            x: (bits >> 32) as u32,
            y: bits as u32,
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

const fn approach(from: u32, to: u32) -> u32 {
    if from < to {
        from.saturating_add(1)
    } else if from > to {
        from.saturating_sub(1)
    } else {
        from
    }
}
