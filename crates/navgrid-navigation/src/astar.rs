//! A* over the navigation grid.
//!
//! ```text
//! f(n) = g(n) + h(n)
//!
//! g(n) = step cost from the origin cell to n (10 orthogonal, 14 diagonal)
//! h(n) = octile distance from n to the destination cell
//! ```
//!
//! Open set: binary heap ordered by `(f, h, first-insertion order)`, smallest
//! first. An improved cell is pushed again and the superseded entry is skipped
//! on pop.
//!
//! Closed set: per-search records indexed by `row * cols + col`.

use crate::map::{Cell, CellCoord, NavGrid};
use navgrid_geometry::WorldPoint;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cost of one orthogonal step.
pub const ORTHOGONAL_COST: u32 = 10;
/// Cost of one diagonal step (10 * sqrt(2), rounded).
pub const DIAGONAL_COST: u32 = 14;

/// Represents the result of an A* pathfinding operation with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult<T> {
    /// The computed path, if one was found. Excludes the origin cell.
    pub path: Option<Vec<T>>,
    /// The total step cost of the path.
    pub total_cost: Option<u32>,
    /// The number of cells closed during the search.
    pub nodes_explored: usize,
    /// The length of the path (number of waypoints).
    pub path_length: usize,
}

impl<T> PathResult<T> {
    /// Creates a new PathResult for a successful path.
    pub fn success(path: Vec<T>, total_cost: u32, nodes_explored: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            total_cost: Some(total_cost),
            nodes_explored,
            path_length,
        }
    }

    /// Creates a new PathResult for a failed path search.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: None,
            total_cost: None,
            nodes_explored,
            path_length: 0,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the path, or an empty one if the search failed.
    pub fn into_path(self) -> Vec<T> {
        self.path.unwrap_or_default()
    }
}

impl<T> fmt::Display for PathResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path_length,
                self.total_cost.unwrap_or(0),
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

/// Bounds placed on a single search by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchLimits {
    /// Maximum number of cells to close before giving up. `None` searches until
    /// the open set is exhausted.
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    /// No limit.
    pub const fn unbounded() -> Self {
        Self {
            max_expansions: None,
        }
    }

    /// Stop after closing `max_expansions` cells.
    pub const fn with_max_expansions(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }
}

/// Octile distance between two cells: 14 per diagonal step, 10 per remaining
/// orthogonal step. Used both as the heuristic and as the edge cost.
pub fn octile_distance(a: CellCoord, b: CellCoord) -> u32 {
    let d_row = a.row.abs_diff(b.row) as u32;
    let d_col = a.col.abs_diff(b.col) as u32;
    let diagonal = d_row.min(d_col);
    let straight = d_row.max(d_col) - diagonal;
    DIAGONAL_COST * diagonal + ORTHOGONAL_COST * straight
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
enum VisitState {
    #[default]
    Unseen,
    Open,
    Closed,
}

/// Provisional cost and back-pointer for one cell, scoped to one search.
#[derive(Debug, Copy, Clone, Default)]
struct SearchRecord {
    g: u32,
    h: u32,
    parent: Option<usize>,
    state: VisitState,
    /// Order in which the cell first entered the open set.
    seq: u64,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct OpenEntry {
    f: u32,
    h: u32,
    g: u32,
    seq: u64,
    index: usize,
}

// BinaryHeap is a max-heap; flip every comparison so the smallest (f, h, seq) pops first.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Walks parent links from `current` back to the origin. The origin itself is
/// not included.
fn reconstruct_path(records: &[SearchRecord], cols: usize, mut current: usize) -> Vec<CellCoord> {
    let mut path = Vec::new();
    while let Some(previous) = records[current].parent {
        path.push(CellCoord::new(current / cols, current % cols));
        current = previous;
    }
    path.reverse();
    path
}

/// Finds a path between two cells using A*.
///
/// # Arguments
/// * `grid` - The grid to plan in.
/// * `origin` - Starting cell.
/// * `destination` - Goal cell.
///
/// # Returns
/// * `Vec<CellCoord>` - The cells after `origin` up to and including
///   `destination`, or an empty path if none exists.
pub fn astar_search(grid: &NavGrid, origin: CellCoord, destination: CellCoord) -> Vec<CellCoord> {
    astar_search_detailed(grid, origin, destination, SearchLimits::unbounded()).into_path()
}

/// Finds a path between two cells using A* with detailed results.
///
/// # Arguments
/// * `grid` - The grid to plan in.
/// * `origin` - Starting cell.
/// * `destination` - Goal cell.
/// * `limits` - Caller-imposed bounds; exceeding them is reported as failure.
///
/// # Returns
/// * `PathResult<CellCoord>` - Detailed pathfinding result with metadata.
pub fn astar_search_detailed(
    grid: &NavGrid,
    origin: CellCoord,
    destination: CellCoord,
    limits: SearchLimits,
) -> PathResult<CellCoord> {
    let (Ok(_), Ok(goal_cell)) = (grid.cell(origin), grid.cell(destination)) else {
        debug!(%origin, %destination, "Search endpoint outside the grid");
        return PathResult::failure(0);
    };
    if origin == destination {
        return PathResult::success(Vec::new(), 0, 0);
    }
    if goal_cell.is_blocked() {
        debug!(%destination, "Destination cell is blocked");
        return PathResult::failure(0);
    }

    let cols = grid.cols();
    let start = grid.index(origin);
    let goal = grid.index(destination);

    let mut records = vec![SearchRecord::default(); grid.len()];
    let mut open_set = BinaryHeap::new();
    let mut next_seq: u64 = 0;
    let mut nodes_explored = 0;

    let start_h = octile_distance(origin, destination);
    records[start] = SearchRecord {
        g: 0,
        h: start_h,
        parent: None,
        state: VisitState::Open,
        seq: next_seq,
    };
    open_set.push(OpenEntry {
        f: start_h,
        h: start_h,
        g: 0,
        seq: next_seq,
        index: start,
    });

    while let Some(entry) = open_set.pop() {
        let record = records[entry.index];
        if record.state != VisitState::Open || record.g != entry.g {
            continue;
        }

        if limits.max_expansions.is_some_and(|max| nodes_explored >= max) {
            warn!(
                nodes_explored,
                %origin,
                %destination,
                "Search expansion limit reached, giving up"
            );
            return PathResult::failure(nodes_explored);
        }

        records[entry.index].state = VisitState::Closed;
        nodes_explored += 1;

        if entry.index == goal {
            let path = reconstruct_path(&records, cols, goal);
            debug!(
                nodes_explored,
                path_length = path.len(),
                total_cost = record.g,
                "Path found"
            );
            return PathResult::success(path, record.g, nodes_explored);
        }

        let current = CellCoord::new(entry.index / cols, entry.index % cols);
        for neighbor in grid.neighbors(current) {
            if neighbor.is_blocked() {
                continue;
            }
            let index = grid.index(neighbor.coord());
            let neighbor_record = &mut records[index];
            if neighbor_record.state == VisitState::Closed {
                continue;
            }

            let candidate_g = record
                .g
                .saturating_add(octile_distance(current, neighbor.coord()));
            let in_open = neighbor_record.state == VisitState::Open;
            if candidate_g < neighbor_record.g || !in_open {
                if !in_open {
                    next_seq += 1;
                    neighbor_record.seq = next_seq;
                    neighbor_record.state = VisitState::Open;
                }
                neighbor_record.g = candidate_g;
                neighbor_record.h = octile_distance(neighbor.coord(), destination);
                neighbor_record.parent = Some(entry.index);
                open_set.push(OpenEntry {
                    f: candidate_g.saturating_add(neighbor_record.h),
                    h: neighbor_record.h,
                    g: candidate_g,
                    seq: neighbor_record.seq,
                    index,
                });
            }
        }
    }

    debug!(nodes_explored, %origin, %destination, "No path found");
    PathResult::failure(nodes_explored)
}

/// Finds a path between two world points. Each point is first snapped to its
/// nearest cell with [`NavGrid::world_to_cell`].
///
/// # Returns
/// * `Vec<&Cell>` - Cells after the origin cell up to and including the
///   destination cell; empty when unreachable or when both points share a cell.
pub fn find_path(grid: &NavGrid, origin: WorldPoint, destination: WorldPoint) -> Vec<&Cell> {
    let path = find_path_detailed(grid, origin, destination, SearchLimits::unbounded()).into_path();
    path.into_iter()
        .filter_map(|coord| grid.cell(coord).ok())
        .collect()
}

/// Finds a path between two world points with detailed results.
pub fn find_path_detailed(
    grid: &NavGrid,
    origin: WorldPoint,
    destination: WorldPoint,
    limits: SearchLimits,
) -> PathResult<CellCoord> {
    let origin_cell = grid.world_to_cell(origin).coord();
    let destination_cell = grid.world_to_cell(destination).coord();
    astar_search_detailed(grid, origin_cell, destination_cell, limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cmp::Reverse;

    /// Builds a grid with unit cells whose blocked flags come from `mask`
    /// (row-major). Cell (r, c) is centred on world (r + 0.5, 0, c + 0.5).
    fn grid_from_mask(rows: usize, cols: usize, mask: &[bool]) -> NavGrid {
        let center = WorldPoint::new(rows as f32 / 2.0, 0.0, cols as f32 / 2.0);
        NavGrid::build(center, rows as f32, cols as f32, 1.0, |c: WorldPoint, _: f32| {
            mask[c.x as usize * cols + c.z as usize]
        })
        .unwrap()
    }

    fn open_grid(rows: usize, cols: usize) -> NavGrid {
        grid_from_mask(rows, cols, &vec![false; rows * cols])
    }

    fn path_cost(origin: CellCoord, path: &[CellCoord]) -> u32 {
        let mut previous = origin;
        let mut total = 0;
        for &step in path {
            assert!(
                previous.row.abs_diff(step.row) <= 1 && previous.col.abs_diff(step.col) <= 1,
                "Path steps must be between adjacent cells"
            );
            total += octile_distance(previous, step);
            previous = step;
        }
        total
    }

    /// Reference uniform-cost search using the same adjacency rules.
    fn dijkstra_cost(grid: &NavGrid, origin: CellCoord, destination: CellCoord) -> Option<u32> {
        if grid.cell(destination).unwrap().is_blocked() && origin != destination {
            return None;
        }
        let mut best = vec![u32::MAX; grid.len()];
        let mut heap = BinaryHeap::new();
        best[grid.index(origin)] = 0;
        heap.push(Reverse((0u32, origin)));
        while let Some(Reverse((cost, coord))) = heap.pop() {
            if coord == destination {
                return Some(cost);
            }
            if cost > best[grid.index(coord)] {
                continue;
            }
            for neighbor in grid.neighbors(coord).filter(|n| !n.is_blocked()) {
                let next = cost + octile_distance(coord, neighbor.coord());
                let slot = &mut best[grid.index(neighbor.coord())];
                if next < *slot {
                    *slot = next;
                    heap.push(Reverse((next, neighbor.coord())));
                }
            }
        }
        None
    }

    #[test]
    fn test_octile_distance() {
        let a = CellCoord::new(0, 0);
        assert_eq!(octile_distance(a, a), 0);
        assert_eq!(octile_distance(a, CellCoord::new(0, 1)), 10);
        assert_eq!(octile_distance(a, CellCoord::new(1, 1)), 14);
        assert_eq!(octile_distance(a, CellCoord::new(9, 9)), 126);
        assert_eq!(octile_distance(CellCoord::new(5, 2), CellCoord::new(1, 3)), 14 + 30);
    }

    #[test]
    fn test_astar_diagonal_open_grid() {
        let grid = open_grid(10, 10);
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(9, 9);

        let result = astar_search_detailed(&grid, origin, destination, SearchLimits::unbounded());
        assert!(result.is_success());
        assert_eq!(result.path_length, 9);
        assert_eq!(result.total_cost, Some(126));

        let path = result.into_path();
        let expected: Vec<_> = (1..10).map(|i| CellCoord::new(i, i)).collect();
        assert_eq!(path, expected);
        assert_eq!(*path.last().unwrap(), destination);
    }

    #[test]
    fn test_astar_same_cell() {
        let grid = open_grid(5, 5);
        let cell = CellCoord::new(2, 3);
        let result = astar_search_detailed(&grid, cell, cell, SearchLimits::unbounded());
        assert!(result.is_success());
        assert_eq!(result.total_cost, Some(0));
        assert!(result.into_path().is_empty());

        let world = grid.cell(cell).unwrap().position();
        let nudged = WorldPoint::new(world.x + 0.1, world.y, world.z - 0.1);
        assert!(find_path(&grid, world, nudged).is_empty());
    }

    #[test]
    fn test_astar_blocked_destination() {
        let mut mask = vec![false; 25];
        mask[4 * 5 + 4] = true;
        let grid = grid_from_mask(5, 5, &mask);

        let result = astar_search_detailed(
            &grid,
            CellCoord::new(0, 0),
            CellCoord::new(4, 4),
            SearchLimits::unbounded(),
        );
        assert!(!result.is_success());
        assert!(result.into_path().is_empty());
    }

    #[test]
    fn test_astar_blocked_row_splits_grid() {
        let (rows, cols) = (10, 10);
        let mut mask = vec![false; rows * cols];
        for col in 0..cols {
            mask[5 * cols + col] = true;
        }
        let grid = grid_from_mask(rows, cols, &mask);

        let path = astar_search(&grid, CellCoord::new(0, 0), CellCoord::new(9, 9));
        assert!(path.is_empty(), "Path should not be found when blocked");

        let origin = grid.cell(CellCoord::new(1, 4)).unwrap().position();
        let destination = grid.cell(CellCoord::new(8, 4)).unwrap().position();
        assert!(grid.find_path(origin, destination).is_empty());
    }

    #[test]
    fn test_astar_detours_around_wall() {
        // Column 2 is blocked on rows 0..=3; the only gap is (4, 2).
        let (rows, cols) = (5, 5);
        let mut mask = vec![false; rows * cols];
        for row in 0..4 {
            mask[row * cols + 2] = true;
        }
        let grid = grid_from_mask(rows, cols, &mask);
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(0, 4);

        let result = astar_search_detailed(&grid, origin, destination, SearchLimits::unbounded());
        assert!(result.is_success());
        assert_eq!(result.total_cost, Some(96));

        let path = result.into_path();
        assert!(path.contains(&CellCoord::new(4, 2)));
        assert!(path.iter().all(|&c| !grid.cell(c).unwrap().is_blocked()));
        assert_eq!(path_cost(origin, &path), 96);
    }

    #[test]
    fn test_astar_corner_cutting_allowed() {
        // (0,1) and (1,0) blocked; the diagonal squeeze to (1,1) is still taken.
        let mut mask = vec![false; 9];
        mask[1] = true;
        mask[3] = true;
        let grid = grid_from_mask(3, 3, &mask);
        let path = astar_search(&grid, CellCoord::new(0, 0), CellCoord::new(2, 2));
        assert_eq!(path, vec![CellCoord::new(1, 1), CellCoord::new(2, 2)]);
    }

    #[test]
    fn test_astar_blocked_origin_still_searched() {
        let mut mask = vec![false; 9];
        mask[0] = true;
        let grid = grid_from_mask(3, 3, &mask);
        let path = astar_search(&grid, CellCoord::new(0, 0), CellCoord::new(0, 2));
        assert_eq!(path.last(), Some(&CellCoord::new(0, 2)));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_astar_out_of_bounds_endpoint() {
        let grid = open_grid(4, 4);
        let result = astar_search_detailed(
            &grid,
            CellCoord::new(0, 0),
            CellCoord::new(4, 0),
            SearchLimits::unbounded(),
        );
        assert!(!result.is_success());
        assert_eq!(result.nodes_explored, 0);
    }

    #[test]
    fn test_astar_optimal_on_open_grids() {
        let mut rng = StdRng::seed_from_u64(42);
        let grid = open_grid(15, 12);
        for _ in 0..50 {
            let origin = CellCoord::new(rng.random_range(0..15), rng.random_range(0..12));
            let destination = CellCoord::new(rng.random_range(0..15), rng.random_range(0..12));
            let result = astar_search_detailed(&grid, origin, destination, SearchLimits::unbounded());
            let expected = octile_distance(origin, destination);
            assert_eq!(result.total_cost, Some(expected));
            let path = result.into_path();
            assert_eq!(path_cost(origin, &path), expected);
        }
    }

    #[test]
    fn test_astar_matches_reference_search_with_obstacles() {
        let mut rng = StdRng::seed_from_u64(7);
        let (rows, cols) = (14, 14);
        for _ in 0..20 {
            let mask: Vec<bool> = (0..rows * cols).map(|_| rng.random_bool(0.3)).collect();
            let grid = grid_from_mask(rows, cols, &mask);
            for _ in 0..10 {
                let origin = CellCoord::new(rng.random_range(0..rows), rng.random_range(0..cols));
                let destination =
                    CellCoord::new(rng.random_range(0..rows), rng.random_range(0..cols));

                let result =
                    astar_search_detailed(&grid, origin, destination, SearchLimits::unbounded());
                let reference = dijkstra_cost(&grid, origin, destination);
                assert_eq!(result.total_cost, reference, "{origin} -> {destination}");

                if let Some(cost) = reference {
                    let path = result.into_path();
                    assert_eq!(path_cost(origin, &path), cost);
                    if origin != destination {
                        assert_eq!(path.last(), Some(&destination));
                    }
                    assert!(!path.contains(&origin) || origin == destination);
                }
            }
        }
    }

    #[test]
    fn test_astar_expansion_limit() {
        let grid = open_grid(20, 20);
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(19, 19);

        let capped =
            astar_search_detailed(&grid, origin, destination, SearchLimits::with_max_expansions(5));
        assert!(!capped.is_success());
        assert_eq!(capped.nodes_explored, 5);

        let uncapped = astar_search_detailed(&grid, origin, destination, SearchLimits::default());
        assert!(uncapped.is_success());
        assert!(uncapped.nodes_explored > 5);
    }

    #[test]
    fn test_find_path_world_points() {
        let grid = NavGrid::build(
            WorldPoint::new(0.0, 1.0, 0.0),
            8.0,
            8.0,
            0.5,
            |_: WorldPoint, _: f32| false,
        )
        .unwrap();
        let origin = WorldPoint::new(-3.9, 5.0, -3.9);
        let destination = WorldPoint::new(3.9, -2.0, 0.2);

        let path = find_path(&grid, origin, destination);
        assert!(!path.is_empty());
        assert_eq!(
            path.last().unwrap().coord(),
            grid.world_to_cell(destination).coord()
        );
        assert!(path
            .iter()
            .all(|cell| cell.coord() != grid.world_to_cell(origin).coord()));
    }

    #[test]
    fn test_path_result_display() {
        let result = PathResult::success(vec![CellCoord::new(1, 1)], 14, 3);
        let display_str = format!("{}", result);
        assert!(display_str.contains("success: true"));
        assert!(display_str.contains("total_cost: 14"));

        let failed: PathResult<CellCoord> = PathResult::failure(12);
        assert_eq!(
            format!("{}", failed),
            "PathResult { success: false, nodes_explored: 12 }"
        );
    }
}
