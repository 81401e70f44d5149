//! The navigation grid: construction, coordinate mapping and neighbour queries.

#![warn(missing_docs)]

use navgrid_geometry::WorldPoint;
use tracing::{debug, info};

use super::{Cell, CellCoord, ObstacleTest};
use crate::astar::{self, octile_distance};
use crate::error::NavigationError;

/// Row/column offsets of the eight neighbours, row offset outermost.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A fixed-resolution lattice laid over the ground plane of a 3‑D world.
///
/// The grid is centred on `center`. Rows advance along world x, columns along
/// world z, and the height axis is ignored. Its shape is fixed at
/// construction; cells are stored row-major and addressed as
/// `row * cols + col`.
#[derive(Debug, Clone)]
pub struct NavGrid {
    /// World-space centre of the grid.
    center: WorldPoint,
    /// Requested extent along world x (meters).
    width: f32,
    /// Requested extent along world z (meters).
    depth: f32,
    /// Edge length of each square cell (meters).
    cell_size: f32,
    /// Number of rows (`floor(width / cell_size)`).
    rows: usize,
    /// Number of columns (`floor(depth / cell_size)`).
    cols: usize,
    /// Row-major cell storage.
    cells: Vec<Cell>,
}

impl NavGrid {
    /// Builds the grid and classifies every cell with `obstacle_test`.
    ///
    /// # Arguments
    /// * `center` - World-space centre of the grid
    /// * `width` - Extent along world x (meters)
    /// * `depth` - Extent along world z (meters)
    /// * `cell_size` - Edge length of each square cell (meters)
    /// * `obstacle_test` - Queried once per cell with its centre and half edge length
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid, or an error if the extent or
    ///   cell size cannot produce at least one cell
    pub fn build<T: ObstacleTest>(
        center: WorldPoint,
        width: f32,
        depth: f32,
        cell_size: f32,
        mut obstacle_test: T,
    ) -> Result<Self, NavigationError> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(NavigationError::InvalidCellSize(cell_size));
        }
        if !(width > 0.0) || !(depth > 0.0) || !width.is_finite() || !depth.is_finite() {
            return Err(NavigationError::InvalidExtent {
                width,
                depth,
                reason: "must be positive and finite",
            });
        }

        let rows = (width / cell_size).floor() as usize;
        let cols = (depth / cell_size).floor() as usize;
        if rows == 0 || cols == 0 {
            return Err(NavigationError::InvalidExtent {
                width,
                depth,
                reason: "smaller than a single cell",
            });
        }
        let total_cells = rows
            .checked_mul(cols)
            .ok_or(NavigationError::GridTooLarge { rows, cols })?;

        debug!(rows, cols, cell_size, %center, "Building navigation grid");

        let bottom_left = WorldPoint::new(center.x - width / 2.0, center.y, center.z - depth / 2.0);
        let half_extent = cell_size / 2.0;
        let mut cells = Vec::with_capacity(total_cells);
        for row in 0..rows {
            for col in 0..cols {
                let position = WorldPoint::new(
                    bottom_left.x + (row as f32 + 0.5) * cell_size,
                    bottom_left.y,
                    bottom_left.z + (col as f32 + 0.5) * cell_size,
                );
                let blocked = obstacle_test.is_blocked(position, half_extent);
                cells.push(Cell::new(position, CellCoord::new(row, col), blocked));
            }
        }

        let grid = NavGrid {
            center,
            width,
            depth,
            cell_size,
            rows,
            cols,
            cells,
        };
        info!(
            rows,
            cols,
            blocked = grid.blocked_count(),
            "Navigation grid built"
        );
        Ok(grid)
    }

    /// Number of rows (along world x).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (along world z).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a grid holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Edge length of each cell (meters).
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Requested extent `(width, depth)` in meters.
    pub fn extent(&self) -> (f32, f32) {
        (self.width, self.depth)
    }

    /// World-space centre of the grid.
    pub fn center(&self) -> WorldPoint {
        self.center
    }

    /// World-space corner the cell lattice starts from.
    pub fn bottom_left(&self) -> WorldPoint {
        WorldPoint::new(
            self.center.x - self.width / 2.0,
            self.center.y,
            self.center.z - self.depth / 2.0,
        )
    }

    pub(crate) fn index(&self, coord: CellCoord) -> usize {
        coord.row * self.cols + coord.col
    }

    /// Gets the cell at a row/column index.
    ///
    /// # Returns
    /// * `Result<&Cell, NavigationError>` - The cell, or `OutOfBounds` carrying the
    ///   requested index
    pub fn cell(&self, coord: CellCoord) -> Result<&Cell, NavigationError> {
        if coord.row < self.rows && coord.col < self.cols {
            Ok(&self.cells[self.index(coord)])
        } else {
            Err(NavigationError::OutOfBounds {
                row: coord.row,
                col: coord.col,
            })
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Number of cells an obstacle overlapped at build time.
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_blocked()).count()
    }

    /// Maps a world point to the nearest cell.
    ///
    /// The point is normalised to `[0, 1]` across the span the lattice covers
    /// (`rows * cell_size` by `cols * cell_size`) and clamped, so points off
    /// the grid snap to the nearest edge cell. The fraction is then scaled by
    /// `count - 1` and rounded. A cell's own centre always maps back to that cell.
    pub fn world_to_cell(&self, point: WorldPoint) -> &Cell {
        let bottom_left = self.bottom_left();
        let span_rows = self.rows as f32 * self.cell_size;
        let span_cols = self.cols as f32 * self.cell_size;

        let percent_row = ((point.x - bottom_left.x) / span_rows).clamp(0.0, 1.0);
        let percent_col = ((point.z - bottom_left.z) / span_cols).clamp(0.0, 1.0);

        // NaN input rounds to NaN and saturates to index 0 on the cast.
        let row = (((self.rows - 1) as f32) * percent_row).round() as usize;
        let col = (((self.cols - 1) as f32) * percent_col).round() as usize;

        &self.cells[self.index(CellCoord::new(row.min(self.rows - 1), col.min(self.cols - 1)))]
    }

    /// The up-to-eight in-bounds neighbours of `coord`.
    ///
    /// Blocked neighbours are included. Diagonal moves are not restricted, so
    /// corner cutting is allowed: a diagonal neighbour is returned even when
    /// both orthogonal cells beside the move are blocked.
    pub fn neighbors(&self, coord: CellCoord) -> impl Iterator<Item = &Cell> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(d_row, d_col)| {
            let row = coord.row.checked_add_signed(d_row)?;
            let col = coord.col.checked_add_signed(d_col)?;
            self.cell(CellCoord::new(row, col)).ok()
        })
    }

    /// Octile step cost between two cells (10 per orthogonal step, 14 per diagonal).
    pub fn distance(&self, a: &Cell, b: &Cell) -> u32 {
        octile_distance(a.coord(), b.coord())
    }

    /// Finds a path between two world points with A*.
    ///
    /// Returns the cells after the origin cell, up to and including the
    /// destination cell. The result is empty if the destination is unreachable
    /// or both points map to the same cell.
    pub fn find_path(&self, origin: WorldPoint, destination: WorldPoint) -> Vec<&Cell> {
        astar::find_path(self, origin, destination)
    }

    /// Renders the grid like [`Display`](std::fmt::Display), marking path cells with `*`.
    pub fn render_path(&self, path: &[CellCoord]) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in 0..self.rows {
            for col in 0..self.cols {
                let coord = CellCoord::new(row, col);
                let cell = &self.cells[self.index(coord)];
                let symbol = if path.contains(&coord) {
                    '*'
                } else if cell.is_blocked() {
                    '#'
                } else {
                    '.'
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for NavGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "NavGrid ({}x{}, cell size: {:.3}m)",
            self.rows, self.cols, self.cell_size
        )?;
        write!(f, "{}", self.render_path(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{BoxObstacles, ObstacleBox};
    use approx::assert_relative_eq;
    use navgrid_geometry::Point2;

    fn open_grid(width: f32, depth: f32, cell_size: f32) -> NavGrid {
        NavGrid::build(WorldPoint::default(), width, depth, cell_size, no_obstacles).unwrap()
    }

    fn no_obstacles(_: WorldPoint, _: f32) -> bool {
        false
    }

    #[test]
    fn test_grid_creation() {
        let grid = open_grid(10.0, 6.0, 1.0);
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.len(), 60);
        assert_eq!(grid.blocked_count(), 0);
        assert_eq!(grid.bottom_left(), WorldPoint::new(-5.0, 0.0, -3.0));
    }

    #[test]
    fn test_row_count_floors() {
        let grid = open_grid(10.5, 3.9, 1.0);
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 3);
    }

    #[test]
    fn test_invalid_creation() {
        let origin = WorldPoint::default();
        assert!(matches!(
            NavGrid::build(origin, 10.0, 10.0, 0.0, no_obstacles),
            Err(NavigationError::InvalidCellSize(_))
        ));
        assert!(matches!(
            NavGrid::build(origin, 10.0, 10.0, -1.0, no_obstacles),
            Err(NavigationError::InvalidCellSize(_))
        ));
        assert!(matches!(
            NavGrid::build(origin, 0.0, 10.0, 1.0, no_obstacles),
            Err(NavigationError::InvalidExtent { .. })
        ));
        assert!(matches!(
            NavGrid::build(origin, 10.0, f32::NAN, 1.0, no_obstacles),
            Err(NavigationError::InvalidExtent { .. })
        ));
        assert!(matches!(
            NavGrid::build(origin, 0.5, 10.0, 1.0, no_obstacles),
            Err(NavigationError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn test_obstacle_test_called_once_per_cell() {
        let mut calls = Vec::new();
        let record = |center: WorldPoint, half: f32| {
            calls.push((center, half));
            false
        };
        let grid = NavGrid::build(WorldPoint::default(), 4.0, 3.0, 1.0, record).unwrap();
        assert_eq!(calls.len(), grid.len());
        assert!(calls.iter().all(|&(_, half)| half == 0.5));
    }

    #[test]
    fn test_cell_centers() {
        let center = WorldPoint::new(10.0, 2.0, -4.0);
        let grid = NavGrid::build(center, 4.0, 2.0, 0.5, no_obstacles).unwrap();
        let first = grid.cell(CellCoord::new(0, 0)).unwrap();
        assert_relative_eq!(first.position().x, 8.25, epsilon = 1e-6);
        assert_relative_eq!(first.position().y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(first.position().z, -4.75, epsilon = 1e-6);

        let last = grid.cell(CellCoord::new(7, 3)).unwrap();
        assert_relative_eq!(last.position().x, 11.75, epsilon = 1e-6);
        assert_relative_eq!(last.position().z, -3.25, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_bounds_cell() {
        let grid = open_grid(3.0, 3.0, 1.0);
        assert_eq!(
            grid.cell(CellCoord::new(3, 1)),
            Err(NavigationError::OutOfBounds { row: 3, col: 1 })
        );
        assert!(grid.cell(CellCoord::new(2, 2)).is_ok());
    }

    #[test]
    fn test_world_to_cell_idempotent_on_centers() {
        for grid in [
            open_grid(10.0, 10.0, 1.0),
            open_grid(10.5, 7.2, 0.7),
            open_grid(1.0, 5.0, 1.0),
        ] {
            for cell in grid.cells() {
                assert_eq!(grid.world_to_cell(cell.position()).coord(), cell.coord());
            }
        }
    }

    #[test]
    fn test_world_to_cell_clamps_off_grid() {
        let grid = open_grid(10.0, 10.0, 1.0);
        assert_eq!(
            grid.world_to_cell(WorldPoint::on_ground(-100.0, -100.0)).coord(),
            CellCoord::new(0, 0)
        );
        assert_eq!(
            grid.world_to_cell(WorldPoint::on_ground(100.0, 0.2)).coord(),
            CellCoord::new(9, 5)
        );
        assert_eq!(
            grid.world_to_cell(WorldPoint::new(f32::NAN, 0.0, 50.0)).coord(),
            CellCoord::new(0, 9)
        );
    }

    #[test]
    fn test_world_to_cell_ignores_height() {
        let grid = open_grid(10.0, 10.0, 1.0);
        let low = grid.world_to_cell(WorldPoint::new(1.5, -30.0, 2.5)).coord();
        let high = grid.world_to_cell(WorldPoint::new(1.5, 30.0, 2.5)).coord();
        assert_eq!(low, high);
    }

    #[test]
    fn test_neighbors() {
        let grid = open_grid(5.0, 5.0, 1.0);
        assert_eq!(grid.neighbors(CellCoord::new(2, 2)).count(), 8);
        assert_eq!(grid.neighbors(CellCoord::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbors(CellCoord::new(4, 2)).count(), 5);

        let around_corner: Vec<_> = grid.neighbors(CellCoord::new(0, 0)).map(Cell::coord).collect();
        assert_eq!(
            around_corner,
            vec![CellCoord::new(0, 1), CellCoord::new(1, 0), CellCoord::new(1, 1)]
        );
    }

    #[test]
    fn test_neighbors_include_blocked_and_corner_cuts() {
        // Cells (0,1) and (1,0) are blocked; the diagonal (1,1) is still a neighbour of (0,0).
        let grid = NavGrid::build(
            WorldPoint::new(1.5, 0.0, 1.5),
            3.0,
            3.0,
            1.0,
            |center: WorldPoint, _: f32| {
                let (row, col) = (center.x as usize, center.z as usize);
                (row, col) == (0, 1) || (row, col) == (1, 0)
            },
        )
        .unwrap();
        let neighbors: Vec<_> = grid.neighbors(CellCoord::new(0, 0)).collect();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors.iter().filter(|c| c.is_blocked()).count(), 2);
        assert!(neighbors.iter().any(|c| c.coord() == CellCoord::new(1, 1)));
    }

    #[test]
    fn test_distance() {
        let grid = open_grid(10.0, 10.0, 1.0);
        let a = grid.cell(CellCoord::new(0, 0)).unwrap();
        let b = grid.cell(CellCoord::new(3, 7)).unwrap();
        assert_eq!(grid.distance(a, b), 14 * 3 + 10 * 4);
        assert_eq!(grid.distance(b, a), grid.distance(a, b));
    }

    #[test]
    fn test_box_obstacles_mark_cells() {
        let obstacles = BoxObstacles::new(vec![ObstacleBox::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.4, 0.4),
        )]);
        let grid = NavGrid::build(WorldPoint::default(), 4.0, 4.0, 1.0, &obstacles).unwrap();
        // The box straddles the four centre cells.
        assert_eq!(grid.blocked_count(), 4);
        assert!(grid.cell(CellCoord::new(1, 1)).unwrap().is_blocked());
        assert!(grid.cell(CellCoord::new(2, 2)).unwrap().is_blocked());
        assert!(!grid.cell(CellCoord::new(0, 0)).unwrap().is_blocked());
    }

    #[test]
    fn test_display() {
        let obstacles = BoxObstacles::new(vec![ObstacleBox::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.2, 0.2),
        )]);
        let grid = NavGrid::build(WorldPoint::default(), 3.0, 3.0, 1.0, &obstacles).unwrap();
        let display_str = format!("{}", grid);
        assert!(display_str.contains("NavGrid (3x3"));
        assert!(display_str.contains("...\n.#.\n...\n"));

        let rendered = grid.render_path(&[CellCoord::new(0, 0), CellCoord::new(2, 2)]);
        assert_eq!(rendered, "*..\n.#.\n..*\n");
    }
}
