#![warn(missing_docs)]
#![doc = "Grid navigation: a fixed-resolution lattice over a 3D world, A* path search"]
#![doc = "with octile step costs, and turn-line construction for path following."]
#![doc = ""]
#![doc = "A [`NavGrid`] is built once from a world extent and an [`ObstacleTest`]."]
#![doc = "Searches keep their bookkeeping private, so one grid may be searched from"]
#![doc = "several threads at once."]

pub mod astar;
pub mod error;
pub mod map;
pub mod turn_lines;

pub use astar::{
    PathResult, SearchLimits, astar_search, astar_search_detailed, find_path, find_path_detailed,
};
pub use error::NavigationError;
pub use map::{BoxObstacles, Cell, CellCoord, NavGrid, ObstacleBox, ObstacleTest};
pub use navgrid_geometry::{Point2, TurnLine, WorldPoint};
pub use turn_lines::{build_turn_lines, build_turn_lines_from_points};
