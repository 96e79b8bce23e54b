//! Grid-adjacent movement.
//!
//! Each axis independently moves by -1, 0, or +1. A proposal that would
//! leave the grid is discarded and the actor stays put for that step; it
//! is not retried. Where the steps come from is abstracted behind
//! [`StepSource`] so tests can script or freeze movement.

use std::collections::VecDeque;

use carrotfield_types::Position;
use carrotfield_world::{Grid, Occupant};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A single-cell movement proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    /// Row delta in `-1..=1`.
    pub dx: i8,
    /// Column delta in `-1..=1`.
    pub dy: i8,
}

impl Step {
    /// Stay in place.
    pub const STAY: Self = Self { dx: 0, dy: 0 };

    /// A step with each delta clamped into `-1..=1`.
    pub fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.clamp(-1, 1),
            dy: dy.clamp(-1, 1),
        }
    }
}

/// Supplies movement proposals to an actor loop.
pub trait StepSource: Send {
    /// The next proposal.
    fn next_step(&mut self) -> Step;
}

/// Uniformly random steps: each axis independently from `{-1, 0, +1}`.
#[derive(Debug, Clone)]
pub struct RandomSteps {
    rng: SmallRng,
}

impl RandomSteps {
    /// Seeded source; the controller derives one seed per actor.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl StepSource for RandomSteps {
    fn next_step(&mut self) -> Step {
        Step {
            dx: self.rng.random_range(-1..=1),
            dy: self.rng.random_range(-1..=1),
        }
    }
}

/// Never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stationary;

impl StepSource for Stationary {
    fn next_step(&mut self) -> Step {
        Step::STAY
    }
}

/// Plays back a fixed sequence, then stays put.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSteps {
    steps: VecDeque<Step>,
}

impl ScriptedSteps {
    /// Source that replays `steps` in order.
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

impl StepSource for ScriptedSteps {
    fn next_step(&mut self) -> Step {
        self.steps.pop_front().unwrap_or(Step::STAY)
    }
}

/// Apply `step` from `from`, keeping the old position if the result is
/// off-grid.
pub fn apply_step<A: Occupant>(grid: &Grid<A>, from: Position, step: Step) -> Position {
    from.offset(i32::from(step.dx), i32::from(step.dy))
        .filter(|next| grid.contains(*next))
        .unwrap_or(from)
}
