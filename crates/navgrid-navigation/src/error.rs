//! This module defines the error types used by the `navgrid-navigation` crate.

#![warn(missing_docs)]

use thiserror::Error;

/// Error type for navigation operations.
///
/// Every variant describes malformed input caught before any work is done.
/// An unreachable destination is not an error: path searches report it as an
/// empty path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// Returned when the cell edge length is not a positive, finite number.
    #[error("invalid cell size {0}: must be positive and finite")]
    InvalidCellSize(f32),
    /// Returned when the world extent is not positive and finite, or is
    /// smaller than a single cell along either axis.
    #[error("invalid grid extent {width}x{depth}: {reason}")]
    InvalidExtent {
        /// Requested extent along world x.
        width: f32,
        /// Requested extent along world z.
        depth: f32,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Returned when `rows * cols` does not fit in memory addressing.
    #[error("grid of {rows}x{cols} cells is too large")]
    GridTooLarge {
        /// Row count that was requested.
        rows: usize,
        /// Column count that was requested.
        cols: usize,
    },
    /// Returned when a cell index lies outside the grid.
    #[error("cell ({row}, {col}) is out of bounds")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
    /// Returned when the turn distance is negative or not finite.
    #[error("invalid turn distance {0}: must be finite and non-negative")]
    InvalidTurnDistance(f32),
}
