//! Obstacle predicates consulted while building a [`NavGrid`](super::NavGrid).

use navgrid_geometry::{Point2, WorldPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Answers "is any blocking geometry overlapping this cell?" at grid build time.
///
/// The grid never performs collision queries itself. It calls
/// [`ObstacleTest::is_blocked`] exactly once per cell with the cell centre and
/// the half edge length of the cell's axis-aligned box.
pub trait ObstacleTest {
    /// Returns `true` if the box of `half_extent` centred on `center` is obstructed.
    fn is_blocked(&mut self, center: WorldPoint, half_extent: f32) -> bool;
}

impl<F> ObstacleTest for F
where
    F: FnMut(WorldPoint, f32) -> bool,
{
    fn is_blocked(&mut self, center: WorldPoint, half_extent: f32) -> bool {
        self(center, half_extent)
    }
}

/// An axis-aligned box on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleBox {
    /// Centre of the box (world x, world z).
    pub center: Point2,
    /// Half edge lengths along world x and world z.
    pub half_extents: Point2,
}

impl ObstacleBox {
    /// Creates a new box from its centre and half extents.
    pub const fn new(center: Point2, half_extents: Point2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Returns `true` if a square of `half_extent` centred on `point` overlaps
    /// this box. Boxes that only touch along an edge do not overlap.
    pub fn overlaps(&self, point: Point2, half_extent: f32) -> bool {
        (point.x - self.center.x).abs() < self.half_extents.x + half_extent
            && (point.y - self.center.y).abs() < self.half_extents.y + half_extent
    }
}

/// A static set of box obstacles, usable as an [`ObstacleTest`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxObstacles {
    boxes: Vec<ObstacleBox>,
}

impl BoxObstacles {
    /// Creates an obstacle set from a list of boxes.
    pub fn new(boxes: Vec<ObstacleBox>) -> Self {
        Self { boxes }
    }

    /// The boxes in this set.
    pub fn boxes(&self) -> &[ObstacleBox] {
        &self.boxes
    }

    /// Returns `true` if any box overlaps the cell square.
    pub fn any_overlap(&self, center: WorldPoint, half_extent: f32) -> bool {
        let ground = center.ground();
        self.boxes.iter().any(|b| b.overlaps(ground, half_extent))
    }
}

impl ObstacleTest for &BoxObstacles {
    fn is_blocked(&mut self, center: WorldPoint, half_extent: f32) -> bool {
        self.any_overlap(center, half_extent)
    }
}
