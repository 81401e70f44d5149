//! Cell identity and static per-cell data.

use navgrid_geometry::{Point2, WorldPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row/column index of a cell within a [`NavGrid`](super::NavGrid).
///
/// Rows advance along world x, columns along world z.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellCoord {
    /// Row index (world x axis).
    pub row: usize,
    /// Column index (world z axis).
    pub col: usize,
}

impl CellCoord {
    /// Creates a new `CellCoord`.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One square of the navigable surface.
///
/// Only static data lives here: the world-space centre, the cell's identity and
/// whether an obstacle overlaps it. Search bookkeeping is kept per query by the
/// path finder so a grid can be searched from several threads at once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    position: WorldPoint,
    coord: CellCoord,
    blocked: bool,
}

impl Cell {
    pub(crate) fn new(position: WorldPoint, coord: CellCoord, blocked: bool) -> Self {
        Self {
            position,
            coord,
            blocked,
        }
    }

    /// World-space centre of the cell.
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    /// Centre of the cell projected onto the ground plane.
    pub fn ground(&self) -> Point2 {
        self.position.ground()
    }

    /// Row/column identity of the cell.
    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.coord.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.coord.col
    }

    /// Returns `true` if an obstacle overlapped this cell when the grid was built.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}
