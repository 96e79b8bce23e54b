//! Per-cell growth state machine.
//!
//! A cell's `(state, growth_stage)` pair is packed into one [`AtomicU8`] so
//! every transition is a single atomic store or compare-and-swap. Two
//! actors racing on the same cell (a grow tick against a plant, say) can
//! only ever observe or produce a pair that one of the transitions would
//! have written. There is no grid-wide lock.

use std::sync::atomic::{AtomicU8, Ordering};

use carrotfield_types::CellState;
use serde::{Deserialize, Serialize};

/// Growth stage at which a growing cell becomes [`CellState::Ready`].
pub const MAX_GROWTH: u8 = 5;

const STAGE_MASK: u8 = 0b0000_1111;
const STATE_SHIFT: u32 = 4;

/// A point-in-time copy of a cell's state pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Growth state.
    pub state: CellState,
    /// Growth counter; only meaningful while growing, `MAX_GROWTH` when ready.
    pub growth_stage: u8,
}

/// One grid position's growable resource.
#[derive(Debug)]
pub struct Cell {
    packed: AtomicU8,
}

impl Cell {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            packed: AtomicU8::new(encode(CellState::Empty, 0)),
        }
    }

    /// Start a new crop: `Growing` at stage 0. Valid from any state.
    pub fn plant(&self) {
        self.packed
            .store(encode(CellState::Growing, 0), Ordering::Release);
    }

    /// Mark the cell eaten: `Damaged` at stage 0. Valid from any state.
    pub fn damage(&self) {
        self.packed
            .store(encode(CellState::Damaged, 0), Ordering::Release);
    }

    /// Clear the cell back to `Empty` at stage 0. Valid from any state.
    pub fn repair(&self) {
        self.packed.store(encode(CellState::Empty, 0), Ordering::Release);
    }

    /// Advance growth by one stage.
    ///
    /// Silently does nothing unless the cell is `Growing`. Reaching
    /// [`MAX_GROWTH`] turns the cell `Ready`. Returns `true` if the cell
    /// changed.
    pub fn grow(&self) -> bool {
        self.packed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let (state, stage) = decode(bits);
                if state != CellState::Growing {
                    return None;
                }
                let next = stage.saturating_add(1).min(MAX_GROWTH);
                let next_state = if next >= MAX_GROWTH {
                    CellState::Ready
                } else {
                    CellState::Growing
                };
                Some(encode(next_state, next))
            })
            .is_ok()
    }

    /// Read both fields in one atomic load.
    pub fn snapshot(&self) -> CellSnapshot {
        let (state, growth_stage) = decode(self.packed.load(Ordering::Acquire));
        CellSnapshot {
            state,
            growth_stage,
        }
    }

    /// Current growth state.
    pub fn state(&self) -> CellState {
        self.snapshot().state
    }

    /// Current growth stage.
    pub fn growth_stage(&self) -> u8 {
        self.snapshot().growth_stage
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

const fn state_code(state: CellState) -> u8 {
    match state {
        CellState::Empty => 0,
        CellState::Growing => 1,
        CellState::Ready => 2,
        CellState::Damaged => 3,
    }
}

const fn encode(state: CellState, stage: u8) -> u8 {
    (state_code(state) << STATE_SHIFT) | (stage & STAGE_MASK)
}

const fn decode(bits: u8) -> (CellState, u8) {
    let state = match bits >> STATE_SHIFT {
        1 => CellState::Growing,
        2 => CellState::Ready,
        3 => CellState::Damaged,
        _ => CellState::Empty,
    };
    (state, bits & STAGE_MASK)
}
