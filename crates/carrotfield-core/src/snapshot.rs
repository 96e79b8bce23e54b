//! Durable per-cell record of a grid.
//!
//! Only cell state is persisted. Actors are deliberately left out: their
//! mid-stride state means nothing across a save boundary, and a load
//! recreates the initial producer population instead.
//!
//! The record is JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": "2026-01-01T00:00:00Z",
//!   "size": 2,
//!   "cells": [
//!     { "state": "ready", "growth_stage": 5 },
//!     { "state": "empty", "growth_stage": 0 },
//!     { "state": "growing", "growth_stage": 3 },
//!     { "state": "damaged", "growth_stage": 0 }
//!   ]
//! }
//! ```
//!
//! `cells` is row-major: `(row, col)` lands at `row * size + col`.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use carrotfield_types::CellState;
use carrotfield_world::grid::MAX_GRID_SIZE;
use carrotfield_world::{Cell, CellSnapshot, Grid, MAX_GROWTH, Occupant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Errors from saving or loading a grid record.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The target could not be read or written.
    #[error("snapshot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The record is not valid JSON for this format.
    #[error("snapshot is not valid JSON: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The record parsed but describes an impossible grid.
    #[error("snapshot is corrupt: {reason}")]
    Corrupt {
        /// What was wrong with it.
        reason: String,
    },
}

/// One cell in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Growth state.
    pub state: CellState,
    /// Growth stage; meaningful only while growing.
    #[serde(default)]
    pub growth_stage: u8,
}

impl From<CellSnapshot> for CellRecord {
    fn from(snapshot: CellSnapshot) -> Self {
        Self {
            state: snapshot.state,
            growth_stage: snapshot.growth_stage,
        }
    }
}

impl CellRecord {
    /// Whether a live cell could hold this pair. A growing cell turns
    /// ready on reaching [`MAX_GROWTH`]; other states ignore the stage up
    /// to that bound.
    pub const fn is_possible(&self) -> bool {
        match self.state {
            CellState::Growing => self.growth_stage < MAX_GROWTH,
            CellState::Empty | CellState::Ready | CellState::Damaged => {
                self.growth_stage <= MAX_GROWTH
            }
        }
    }

    /// Drive `cell` into this record's state through its public
    /// transitions: repair, plant plus one grow per stage, or damage.
    pub fn replay(&self, cell: &Cell) {
        match self.state {
            CellState::Empty => cell.repair(),
            CellState::Damaged => cell.damage(),
            CellState::Growing => {
                cell.plant();
                for _ in 0..self.growth_stage {
                    cell.grow();
                }
            }
            CellState::Ready => {
                cell.plant();
                for _ in 0..MAX_GROWTH {
                    cell.grow();
                }
            }
        }
    }
}

/// The persisted form of a grid's cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Record format version.
    pub version: u32,
    /// When the record was taken.
    pub saved_at: DateTime<Utc>,
    /// Side length of the grid.
    pub size: u32,
    /// Row-major cell records, `size * size` of them.
    pub cells: Vec<CellRecord>,
}

impl GridSnapshot {
    /// Record every cell of `grid`.
    pub fn capture<A: Occupant>(grid: &Grid<A>) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            size: grid.size(),
            cells: grid
                .cell_snapshots()
                .into_iter()
                .map(CellRecord::from)
                .collect(),
        }
    }

    /// Reject records that cannot describe a valid grid.
    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }
        if self.size == 0 {
            return Err(corrupt("grid size is zero"));
        }
        if self.size > MAX_GRID_SIZE {
            return Err(corrupt(format!(
                "grid size {} exceeds the maximum of {MAX_GRID_SIZE}",
                self.size
            )));
        }
        let expected = u64::from(self.size).saturating_mul(u64::from(self.size));
        if u64::try_from(self.cells.len()).ok() != Some(expected) {
            return Err(corrupt(format!(
                "expected {expected} cells for size {}, found {}",
                self.size,
                self.cells.len()
            )));
        }
        if let Some((index, record)) = self
            .cells
            .iter()
            .enumerate()
            .find(|(_, record)| !record.is_possible())
        {
            return Err(corrupt(format!(
                "cell {index} is {} at growth stage {}",
                record.state, record.growth_stage
            )));
        }
        Ok(())
    }

    /// Replay the record onto `grid`, cell by cell.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Corrupt`] if the record is invalid or
    /// its size differs from the grid's.
    pub fn apply_to<A: Occupant>(&self, grid: &Grid<A>) -> Result<(), PersistenceError> {
        self.validate()?;
        if self.size != grid.size() {
            return Err(corrupt(format!(
                "record size {} does not match grid size {}",
                self.size,
                grid.size()
            )));
        }
        for ((_, cell), record) in grid.cells().zip(&self.cells) {
            record.replay(cell);
        }
        Ok(())
    }

    /// Serialize as JSON into `writer`.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse and validate a JSON record from `reader`.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, PersistenceError> {
        let snapshot: Self = serde_json::from_reader(BufReader::new(reader))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the record to a file, creating parent directories as needed.
    pub fn save_to_path(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_json(file)
    }

    /// Read a record from a file.
    pub fn load_from_path(path: &Path) -> Result<Self, PersistenceError> {
        let file = std::fs::File::open(path)?;
        Self::read_json(file)
    }
}

fn corrupt(reason: impl Into<String>) -> PersistenceError {
    PersistenceError::Corrupt {
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use carrotfield_agents::Field;
    use carrotfield_types::Position;

    use super::*;

    fn sample_grid() -> Field {
        let grid = Field::new(3).unwrap();
        grid.cell(Position::new(0, 1)).plant();
        grid.cell(Position::new(0, 1)).grow();
        grid.cell(Position::new(0, 1)).grow();
        let ready = grid.cell(Position::new(1, 1));
        ready.plant();
        for _ in 0..MAX_GROWTH {
            ready.grow();
        }
        grid.cell(Position::new(2, 0)).damage();
        grid
    }

    #[test]
    fn capture_is_row_major() {
        let snapshot = GridSnapshot::capture(&sample_grid());
        assert_eq!(snapshot.size, 3);
        assert_eq!(snapshot.cells.len(), 9);
        assert_eq!(
            snapshot.cells[1],
            CellRecord {
                state: CellState::Growing,
                growth_stage: 2
            }
        );
        assert_eq!(snapshot.cells[4].state, CellState::Ready);
        assert_eq!(snapshot.cells[6].state, CellState::Damaged);
    }

    #[test]
    fn restore_reproduces_every_cell() {
        let original = sample_grid();
        let mut buffer = Vec::new();
        GridSnapshot::capture(&original).write_json(&mut buffer).unwrap();

        let restored = Field::new(3).unwrap();
        GridSnapshot::read_json(buffer.as_slice())
            .unwrap()
            .apply_to(&restored)
            .unwrap();
        assert_eq!(restored.cell_snapshots(), original.cell_snapshots());
        assert_eq!(restored.cell(Position::new(1, 1)).growth_stage(), MAX_GROWTH);
    }

    #[test]
    fn ready_record_restores_to_max_growth() {
        let record = CellRecord {
            state: CellState::Ready,
            growth_stage: 0,
        };
        let cell = Cell::new();
        record.replay(&cell);
        assert_eq!(cell.state(), CellState::Ready);
        assert_eq!(cell.growth_stage(), MAX_GROWTH);
    }

    #[test]
    fn replay_overwrites_previous_state() {
        let cell = Cell::new();
        cell.damage();
        CellRecord {
            state: CellState::Empty,
            growth_stage: 0,
        }
        .replay(&cell);
        assert_eq!(cell.state(), CellState::Empty);
    }

    #[test]
    fn rejects_wrong_cell_count() {
        let mut snapshot = GridSnapshot::capture(&sample_grid());
        snapshot.cells.pop();
        assert!(matches!(snapshot.validate(), Err(PersistenceError::Corrupt { .. })));
    }

    #[test]
    fn rejects_stage_above_max() {
        let mut snapshot = GridSnapshot::capture(&sample_grid());
        snapshot.cells[0].growth_stage = MAX_GROWTH + 1;
        assert!(matches!(snapshot.validate(), Err(PersistenceError::Corrupt { .. })));
    }

    #[test]
    fn rejects_growing_at_max_stage() {
        let mut snapshot = GridSnapshot::capture(&sample_grid());
        snapshot.cells[1] = CellRecord {
            state: CellState::Growing,
            growth_stage: MAX_GROWTH,
        };
        assert!(matches!(snapshot.validate(), Err(PersistenceError::Corrupt { .. })));

        let restored = Field::new(3).unwrap();
        assert!(snapshot.apply_to(&restored).is_err());
        assert_eq!(restored.cell(Position::new(0, 1)).state(), CellState::Empty);
    }

    #[test]
    fn rejects_size_above_grid_maximum() {
        let oversized = GridSnapshot {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            size: MAX_GRID_SIZE + 1,
            cells: Vec::new(),
        };
        assert!(matches!(oversized.validate(), Err(PersistenceError::Corrupt { .. })));
    }

    #[test]
    fn rejects_zero_size_and_size_mismatch() {
        let empty = GridSnapshot {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            size: 0,
            cells: Vec::new(),
        };
        assert!(empty.validate().is_err());

        let snapshot = GridSnapshot::capture(&sample_grid());
        let other = Field::new(4).unwrap();
        assert!(matches!(snapshot.apply_to(&other), Err(PersistenceError::Corrupt { .. })));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = GridSnapshot::read_json(&b"{ not json"[..]).unwrap_err();
        assert!(matches!(err, PersistenceError::Json { .. }));
    }

    #[test]
    fn states_serialize_snake_case() {
        let json = serde_json::to_value(CellRecord {
            state: CellState::Growing,
            growth_stage: 3,
        })
        .unwrap();
        assert_eq!(json["state"], "growing");
        assert_eq!(json["growth_stage"], 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GridSnapshot::load_from_path(Path::new("/nonexistent/carrotfield/grid.json"))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }
}
