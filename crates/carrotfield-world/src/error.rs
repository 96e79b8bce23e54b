//! Error types for the `carrotfield-world` crate.

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The requested grid size cannot be allocated.
    #[error("invalid grid size {size}: must be between 1 and {max}")]
    InvalidSize {
        /// The rejected size.
        size: u32,
        /// Largest supported size.
        max: u32,
    },

    /// A coordinate lies outside the grid.
    #[error("position ({x}, {y}) is outside a {size}x{size} grid")]
    OutOfBounds {
        /// Requested row.
        x: i64,
        /// Requested column.
        y: i64,
        /// Grid dimension.
        size: u32,
    },
}
