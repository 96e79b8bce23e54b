//! The square grid of cells plus its actor registry.
//!
//! Cells are stored row-major in a flat vector that is never resized. Each
//! cell synchronizes itself, so the grid needs no lock of its own; the
//! registry handles its own concurrency.

use std::sync::Arc;

use carrotfield_types::{ActorId, ActorKind, CellState, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::{Cell, CellSnapshot};
use crate::error::WorldError;
use crate::occupant::Occupant;
use crate::registry::ActorRegistry;

/// Largest supported grid dimension.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Number of cells in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCensus {
    /// Empty cells.
    pub empty: usize,
    /// Growing cells.
    pub growing: usize,
    /// Ready cells.
    pub ready: usize,
    /// Damaged cells.
    pub damaged: usize,
}

impl CellCensus {
    fn record(&mut self, state: CellState) {
        let slot = match state {
            CellState::Empty => &mut self.empty,
            CellState::Growing => &mut self.growing,
            CellState::Ready => &mut self.ready,
            CellState::Damaged => &mut self.damaged,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Number of active actors of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCensus {
    /// Active producers.
    pub producers: usize,
    /// Active consumers.
    pub consumers: usize,
    /// Active protectors.
    pub protectors: usize,
}

/// Read-only picture of the grid for an external renderer.
///
/// Individual reads are race-free but the view is assembled cell by cell,
/// so it is not a single consistent instant across the whole grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridView {
    /// Grid dimension.
    pub size: u32,
    /// Cell states in row-major order.
    pub cells: Vec<CellState>,
    /// Positions of active actors, in registry order.
    pub actors: Vec<(Position, ActorKind)>,
}

impl GridView {
    /// State of the cell at `pos`, if in range.
    pub fn cell(&self, pos: Position) -> Option<CellState> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        let index = pos
            .x
            .checked_mul(self.size)
            .and_then(|row| row.checked_add(pos.y))?;
        self.cells.get(usize::try_from(index).ok()?).copied()
    }
}

/// The shared world: a fixed `size x size` cell array and the actor registry.
#[derive(Debug)]
pub struct Grid<A> {
    size: u32,
    cells: Vec<Cell>,
    actors: ActorRegistry<A>,
}

impl<A: Occupant> Grid<A> {
    /// Build a grid of empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidSize`] for a zero size or one larger
    /// than [`MAX_GRID_SIZE`].
    pub fn new(size: u32) -> Result<Self, WorldError> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(WorldError::InvalidSize {
                size,
                max: MAX_GRID_SIZE,
            });
        }
        let count = usize::try_from(size.saturating_mul(size)).map_err(|_overflow| {
            WorldError::InvalidSize {
                size,
                max: MAX_GRID_SIZE,
            }
        })?;
        let cells = std::iter::repeat_with(Cell::new).take(count).collect();
        debug!(size, "Grid created");
        Ok(Self {
            size,
            cells,
            actors: ActorRegistry::new(),
        })
    }

    /// Grid dimension.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Bounds check on signed coordinates, so that movement proposals can
    /// be tested before they are turned into a [`Position`].
    pub fn is_valid_position(&self, x: i64, y: i64) -> bool {
        let size = i64::from(self.size);
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Whether `pos` lies on the grid.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// Validate signed coordinates into a [`Position`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the coordinate is off-grid.
    pub fn position(&self, x: i64, y: i64) -> Result<Position, WorldError> {
        if !self.is_valid_position(x, y) {
            return Err(WorldError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return Err(WorldError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        };
        Ok(Position::new(x, y))
    }

    /// The cell at `pos`.
    ///
    /// Callers validate coordinates first; an off-grid position is a
    /// programming error and panics.
    #[allow(clippy::indexing_slicing)]
    pub fn cell(&self, pos: Position) -> &Cell {
        assert!(
            self.contains(pos),
            "cell {pos} outside {0}x{0} grid",
            self.size
        );
        &self.cells[self.index(pos)]
    }

    /// The cell at `pos`, or `None` when off-grid.
    pub fn try_cell(&self, pos: Position) -> Option<&Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    #[allow(clippy::arithmetic_side_effects)]
    const fn index(&self, pos: Position) -> usize {
        // `contains` bounds both coordinates by `size <= MAX_GRID_SIZE`.
        (pos.x as usize) * (self.size as usize) + pos.y as usize
    }

    /// Every cell with its position, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let size = self.size;
        (0..size)
            .flat_map(move |x| (0..size).map(move |y| Position::new(x, y)))
            .zip(self.cells.iter())
    }

    /// Advance growth on every cell, row-major.
    pub fn update_growth(&self) {
        let grown = self.cells.iter().filter(|cell| cell.grow()).count();
        debug!(grown, "Growth tick applied");
    }

    /// Register an actor.
    pub fn add_actor(&self, actor: Arc<A>) {
        debug!(actor_id = %actor.id(), kind = %actor.kind(), "Actor registered");
        self.actors.add(actor);
    }

    /// Unregister an actor. Absent actors are ignored.
    pub fn remove_actor(&self, id: ActorId) -> bool {
        let removed = self.actors.remove(id);
        if removed {
            debug!(actor_id = %id, "Actor unregistered");
        }
        removed
    }

    /// Drop every actor registration.
    pub fn clear_actors(&self) {
        self.actors.clear();
    }

    /// Point-in-time copy of the registry.
    pub fn actors(&self) -> Arc<Vec<Arc<A>>> {
        self.actors.snapshot()
    }

    /// Look up a registered actor by id.
    pub fn find_actor(&self, id: ActorId) -> Option<Arc<A>> {
        self.actors.get(id)
    }

    /// First active consumer within Chebyshev distance `range` of `origin`,
    /// in registry order. This is a first-match scan, not nearest-first.
    pub fn find_nearby_consumer(&self, origin: Position, range: u32) -> Option<Arc<A>> {
        self.actors
            .snapshot()
            .iter()
            .find(|actor| {
                actor.kind() == ActorKind::Consumer
                    && actor.is_active()
                    && origin.within(actor.position(), range)
            })
            .cloned()
    }

    /// Count cells by state.
    pub fn census(&self) -> CellCensus {
        let mut census = CellCensus::default();
        for cell in &self.cells {
            census.record(cell.state());
        }
        census
    }

    /// Count active actors by kind.
    pub fn actor_counts(&self) -> ActorCensus {
        let mut counts = ActorCensus::default();
        for actor in self.actors.snapshot().iter().filter(|a| a.is_active()) {
            let slot = match actor.kind() {
                ActorKind::Producer => &mut counts.producers,
                ActorKind::Consumer => &mut counts.consumers,
                ActorKind::Protector => &mut counts.protectors,
            };
            *slot = slot.saturating_add(1);
        }
        counts
    }

    /// Snapshot of every cell's state pair, row-major.
    pub fn cell_snapshots(&self) -> Vec<CellSnapshot> {
        self.cells.iter().map(Cell::snapshot).collect()
    }

    /// Assemble a renderer view.
    pub fn view(&self) -> GridView {
        GridView {
            size: self.size,
            cells: self.cells.iter().map(Cell::state).collect(),
            actors: self
                .actors
                .snapshot()
                .iter()
                .filter(|a| a.is_active())
                .map(|a| (a.position(), a.kind()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct Token {
        id: ActorId,
        kind: ActorKind,
        pos: Position,
        active: AtomicBool,
    }

    fn token(kind: ActorKind, x: u32, y: u32) -> Arc<Token> {
        Arc::new(Token {
            id: ActorId::new(),
            kind,
            pos: Position::new(x, y),
            active: AtomicBool::new(true),
        })
    }

    impl Occupant for Token {
        fn id(&self) -> ActorId {
            self.id
        }
        fn kind(&self) -> ActorKind {
            self.kind
        }
        fn position(&self) -> Position {
            self.pos
        }
        fn is_active(&self) -> bool {
            self.active.load(Ordering::Acquire)
        }
    }

    #[test]
    fn rejects_zero_size() {
        assert!(matches!(
            Grid::<Token>::new(0),
            Err(WorldError::InvalidSize { size: 0, .. })
        ));
    }

    #[test]
    fn bounds_checks() {
        let grid = Grid::<Token>::new(4).unwrap();
        assert!(grid.is_valid_position(0, 0));
        assert!(grid.is_valid_position(3, 3));
        assert!(!grid.is_valid_position(-1, 0));
        assert!(!grid.is_valid_position(0, 4));
        assert!(grid.position(4, 1).is_err());
        assert_eq!(grid.try_cell(Position::new(4, 0)).map(Cell::state), None);
    }

    #[test]
    fn find_nearby_consumer_includes_boundary() {
        let grid = Grid::<Token>::new(10).unwrap();
        let rabbit = token(ActorKind::Consumer, 5, 8);
        grid.add_actor(Arc::clone(&rabbit));

        let found = grid.find_nearby_consumer(Position::new(5, 5), 3);
        assert_eq!(found.map(|a| a.id()), Some(rabbit.id));
        assert!(grid.find_nearby_consumer(Position::new(5, 5), 2).is_none());
    }

    #[test]
    fn find_nearby_consumer_skips_inactive_and_other_kinds() {
        let grid = Grid::<Token>::new(10).unwrap();
        let dog = token(ActorKind::Protector, 1, 1);
        let caught = token(ActorKind::Consumer, 1, 2);
        caught.active.store(false, Ordering::Release);
        grid.add_actor(dog);
        grid.add_actor(caught);
        assert!(grid.find_nearby_consumer(Position::new(1, 1), 5).is_none());
    }

    #[test]
    fn find_nearby_consumer_is_first_match_not_nearest() {
        let grid = Grid::<Token>::new(10).unwrap();
        let far = token(ActorKind::Consumer, 4, 4);
        let near = token(ActorKind::Consumer, 1, 0);
        grid.add_actor(Arc::clone(&far));
        grid.add_actor(near);
        let found = grid.find_nearby_consumer(Position::new(0, 0), 5);
        assert_eq!(found.map(|a| a.id()), Some(far.id));
    }

    #[test]
    fn update_growth_touches_only_growing_cells() {
        let grid = Grid::<Token>::new(3).unwrap();
        grid.cell(Position::new(0, 1)).plant();
        grid.cell(Position::new(2, 2)).damage();
        grid.update_growth();

        assert_eq!(grid.cell(Position::new(0, 1)).growth_stage(), 1);
        assert_eq!(grid.cell(Position::new(2, 2)).state(), CellState::Damaged);
        let census = grid.census();
        assert_eq!(census.growing, 1);
        assert_eq!(census.damaged, 1);
        assert_eq!(census.empty, 7);
    }

    #[test]
    fn cells_iterate_row_major() {
        let grid = Grid::<Token>::new(2).unwrap();
        let order: Vec<Position> = grid.cells().map(|(p, _)| p).collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1)
            ]
        );
    }

    #[test]
    fn view_reports_active_actors_and_states() {
        let grid = Grid::<Token>::new(3).unwrap();
        grid.cell(Position::new(1, 2)).plant();
        grid.add_actor(token(ActorKind::Producer, 0, 0));
        let view = grid.view();
        assert_eq!(view.cell(Position::new(1, 2)), Some(CellState::Growing));
        assert_eq!(view.cell(Position::new(3, 0)), None);
        assert_eq!(view.actors, vec![(Position::new(0, 0), ActorKind::Producer)]);
        assert_eq!(grid.actor_counts().producers, 1);
    }
}
