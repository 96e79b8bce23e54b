//! Console rendering of a grid view.
//!
//! One character per cell, rows by `x`, columns by `y`:
//!
//! | char | meaning |
//! |---|---|
//! | `.` | empty |
//! | `g` | growing |
//! | `C` | ready |
//! | `x` | damaged |
//! | `F` | producer |
//! | `R` | consumer |
//! | `D` | protector |
//!
//! When several actors share a cell the protector is drawn over the
//! consumer, and the consumer over the producer.

use std::fmt::Write as _;
use std::io;

use carrotfield_types::{ActorKind, CellState, Position};
use carrotfield_world::{ActorCensus, CellCensus, GridView};

const fn cell_glyph(state: CellState) -> char {
    match state {
        CellState::Empty => '.',
        CellState::Growing => 'g',
        CellState::Ready => 'C',
        CellState::Damaged => 'x',
    }
}

const fn actor_glyph(kind: ActorKind) -> char {
    match kind {
        ActorKind::Producer => 'F',
        ActorKind::Consumer => 'R',
        ActorKind::Protector => 'D',
    }
}

const fn draw_priority(kind: ActorKind) -> u8 {
    match kind {
        ActorKind::Producer => 1,
        ActorKind::Consumer => 2,
        ActorKind::Protector => 3,
    }
}

/// Render `view` as a character map, one line per row.
pub fn render_map(view: &GridView) -> String {
    let size = view.size;
    let mut top: Vec<Option<ActorKind>> = vec![None; view.cells.len()];
    for &(pos, kind) in &view.actors {
        if pos.x >= size || pos.y >= size {
            continue;
        }
        let index = (pos.x as usize)
            .saturating_mul(size as usize)
            .saturating_add(pos.y as usize);
        if let Some(slot) = top.get_mut(index) {
            let replace = slot.is_none_or(|current| draw_priority(kind) > draw_priority(current));
            if replace {
                *slot = Some(kind);
            }
        }
    }

    let mut out = String::with_capacity(view.cells.len().saturating_add(size as usize));
    for x in 0..size {
        for y in 0..size {
            let pos = Position::new(x, y);
            let index = (x as usize)
                .saturating_mul(size as usize)
                .saturating_add(y as usize);
            let glyph = match top.get(index).copied().flatten() {
                Some(kind) => actor_glyph(kind),
                None => view.cell(pos).map_or(' ', cell_glyph),
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// One-line summary of cell and actor counts.
pub fn status_line(cells: &CellCensus, actors: &ActorCensus) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "empty {} growing {} ready {} damaged {} | producers {} consumers {} protectors {}",
        cells.empty,
        cells.growing,
        cells.ready,
        cells.damaged,
        actors.producers,
        actors.consumers,
        actors.protectors,
    );
    line
}

/// Write one frame to `out`: clear the screen, home the cursor, then the
/// map and the status line. Errors from the sink are returned, including
/// the final flush.
pub fn write_frame<W: io::Write>(
    out: &mut W,
    view: &GridView,
    cells: &CellCensus,
    actors: &ActorCensus,
) -> io::Result<()> {
    writeln!(
        out,
        "\x1b[2J\x1b[H{}{}",
        render_map(view),
        status_line(cells, actors)
    )?;
    out.flush()
}
