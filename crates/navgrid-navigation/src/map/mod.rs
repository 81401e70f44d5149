//! Map-related functionality for navigation.
//!
//! This module provides the navigation grid, its cells and the obstacle
//! predicates used to classify cells when the grid is built.

pub mod cell;
pub mod grid;
pub mod obstacles;

pub use cell::{Cell, CellCoord};
pub use grid::NavGrid;
pub use obstacles::{BoxObstacles, ObstacleBox, ObstacleTest};
