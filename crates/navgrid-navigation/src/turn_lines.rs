//! Converts a cell path into the turn lines a follower steers by.

use navgrid_geometry::{Point2, TurnLine, WorldPoint};
use tracing::debug;

use crate::error::NavigationError;
use crate::map::Cell;

/// Builds one [`TurnLine`] per path cell, in path order.
///
/// # Arguments
/// * `path` - Cells as returned by the path finder (origin cell excluded).
/// * `origin` - World position the follower starts from.
/// * `turn_distance` - How far before each node the follower may start turning.
///
/// # Returns
/// * `Result<Vec<TurnLine>, NavigationError>` - The lines, or
///   `InvalidTurnDistance` if `turn_distance` is negative or not finite.
pub fn build_turn_lines(
    path: &[&Cell],
    origin: WorldPoint,
    turn_distance: f32,
) -> Result<Vec<TurnLine>, NavigationError> {
    let points: Vec<Point2> = path.iter().map(|cell| cell.ground()).collect();
    build_turn_lines_from_points(&points, origin.ground(), turn_distance)
}

/// Builds one [`TurnLine`] per ground-plane waypoint.
///
/// Each line sits `turn_distance` before its waypoint along the incoming
/// direction, except the last, which passes through the waypoint itself. The
/// incoming direction is measured from the previous turn point (or `origin`).
///
/// When a waypoint coincides with the previous turn point the previous
/// direction is reused. If there is none yet, the line is
/// [`TurnLine::passed`] and reports crossed immediately.
pub fn build_turn_lines_from_points(
    points: &[Point2],
    origin: Point2,
    turn_distance: f32,
) -> Result<Vec<TurnLine>, NavigationError> {
    if !turn_distance.is_finite() || turn_distance < 0.0 {
        return Err(NavigationError::InvalidTurnDistance(turn_distance));
    }

    let mut lines = Vec::with_capacity(points.len());
    let mut previous_point = origin;
    let mut previous_direction: Option<Point2> = None;

    for (i, &node) in points.iter().enumerate() {
        let is_last = i + 1 == points.len();

        let Some(direction) = (node - previous_point).normalized().or(previous_direction) else {
            lines.push(TurnLine::passed(node));
            previous_point = node;
            continue;
        };

        let turn_point = if is_last {
            node
        } else {
            node - direction * turn_distance
        };

        let mut approach_point = previous_point - direction * turn_distance;
        if approach_point == turn_point {
            // Zero-length segment with nothing to step back over.
            approach_point = turn_point - direction;
        }

        lines.push(TurnLine::new(turn_point, approach_point));
        previous_point = turn_point;
        previous_direction = Some(direction);
    }

    debug!(count = lines.len(), turn_distance, "Built turn lines");
    Ok(lines)
}
