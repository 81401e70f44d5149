//! Turn lines: one-shot decision boundaries for path following.
//!
//! A turn line passes through a turn point and runs perpendicular to the
//! direction an agent approaches it from. The side of the line the approach
//! point lies on is recorded at construction; once a query point reports the
//! other side, the agent has crossed the boundary and should steer toward its
//! next waypoint.

use libm::fabsf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Point2;

/// Sentinel gradient for a vertical line (infinite slope).
pub const VERTICAL_GRADIENT: f32 = f32::MAX;

/// An oriented decision boundary through a turn point.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnLine {
    /// Turn point, the first point on the line.
    point: Point2,
    /// Second point on the line, used for the side test.
    second: Point2,
    /// Slope of the line, or [`VERTICAL_GRADIENT`].
    gradient: f32,
    /// Slope of the approach direction, or [`VERTICAL_GRADIENT`].
    gradient_perpendicular: f32,
    /// Side of the line the approach point lies on. `None` marks a degenerate
    /// line with no approach direction, which always reports crossed.
    approach_side: Option<bool>,
}

impl TurnLine {
    /// Builds the line through `point_on_line` perpendicular to the segment
    /// from `approach_point` to `point_on_line`.
    ///
    /// # Arguments
    ///
    /// * `point_on_line`: The turn point the line passes through.
    /// * `approach_point`: A point behind the line on the approach path; its
    ///   side becomes the approach side.
    pub fn new(point_on_line: Point2, approach_point: Point2) -> Self {
        let delta_x = point_on_line.x - approach_point.x;
        let delta_y = point_on_line.y - approach_point.y;

        let gradient_perpendicular = if delta_x == 0.0 {
            VERTICAL_GRADIENT
        } else {
            delta_y / delta_x
        };

        // Horizontal approach gives a vertical line and vice versa.
        let gradient = if gradient_perpendicular == 0.0 {
            VERTICAL_GRADIENT
        } else if gradient_perpendicular == VERTICAL_GRADIENT {
            0.0
        } else {
            -1.0 / gradient_perpendicular
        };

        let second = if gradient == VERTICAL_GRADIENT {
            point_on_line + Point2::new(0.0, 1.0)
        } else {
            point_on_line + Point2::new(1.0, gradient)
        };

        let mut line = TurnLine {
            point: point_on_line,
            second,
            gradient,
            gradient_perpendicular,
            approach_side: None,
        };
        line.approach_side = Some(line.side(approach_point));
        line
    }

    /// A degenerate turn line at `point` that every query reports as crossed.
    ///
    /// Used when no approach direction exists, e.g. when a waypoint coincides
    /// with the agent's starting position.
    pub fn passed(point: Point2) -> Self {
        TurnLine {
            point,
            second: point,
            gradient: 0.0,
            gradient_perpendicular: VERTICAL_GRADIENT,
            approach_side: None,
        }
    }

    /// The turn point the line passes through.
    pub fn point(&self) -> Point2 {
        self.point
    }

    /// Slope of the line, [`VERTICAL_GRADIENT`] for a vertical line.
    pub fn gradient(&self) -> f32 {
        self.gradient
    }

    /// Returns `true` if the line is vertical (parallel to the ground y axis).
    pub fn is_vertical(&self) -> bool {
        self.gradient == VERTICAL_GRADIENT
    }

    /// Returns `true` for a line built with [`TurnLine::passed`].
    pub fn is_degenerate(&self) -> bool {
        self.approach_side.is_none()
    }

    /// Sign of the cross product of `p - point` and `second - point`.
    fn side(&self, p: Point2) -> bool {
        (p.x - self.point.x) * (self.second.y - self.point.y)
            > (p.y - self.point.y) * (self.second.x - self.point.x)
    }

    /// Returns `true` once `p` lies on the opposite side from the approach side.
    pub fn crossed_line(&self, p: Point2) -> bool {
        match self.approach_side {
            Some(approach_side) => self.side(p) != approach_side,
            None => true,
        }
    }

    /// Perpendicular distance from `p` to the line.
    ///
    /// Computed by intersecting the line with its own perpendicular through
    /// `p`. A degenerate line measures the distance to its point.
    pub fn distance_from_point(&self, p: Point2) -> f32 {
        if self.is_degenerate() {
            return p.distance(self.point);
        }
        if self.is_vertical() {
            return fabsf(p.x - self.point.x);
        }
        if self.gradient_perpendicular == VERTICAL_GRADIENT {
            return fabsf(p.y - self.point.y);
        }

        let y_intercept = self.point.y - self.gradient * self.point.x;
        let y_intercept_perpendicular = p.y - self.gradient_perpendicular * p.x;
        let intersect_x =
            (y_intercept_perpendicular - y_intercept) / (self.gradient - self.gradient_perpendicular);
        let intersect_y = self.gradient * intersect_x + y_intercept;
        p.distance(Point2::new(intersect_x, intersect_y))
    }
}
