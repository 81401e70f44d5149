#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library of ground-plane geometry for grid path following."]
#![doc = ""]
#![doc = "This crate provides world-space and ground-plane point types together with"]
#![doc = "the turn line used to decide when an agent should steer toward its next waypoint."]

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use libm::sqrtf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod turn_line;
pub use turn_line::TurnLine;

/// A point in 3‑D world space (meters). `y` is the height axis; the navigable
/// ground plane is spanned by `x` and `z`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    /// World-frame x position (m).
    pub x: f32,
    /// World-frame height (m).
    pub y: f32,
    /// World-frame z position (m).
    pub z: f32,
}

impl WorldPoint {
    /// Construct a new world point.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        WorldPoint { x, y, z }
    }

    /// Construct a world point on the ground plane (`y = 0`).
    pub const fn on_ground(x: f32, z: f32) -> Self {
        WorldPoint { x, y: 0.0, z }
    }

    /// Project onto the ground plane by dropping the height axis.
    ///
    /// The returned [`Point2`] carries world `x` in `x` and world `z` in `y`.
    pub const fn ground(&self) -> Point2 {
        Point2 {
            x: self.x,
            y: self.z,
        }
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, z: {:.2})", self.x, self.y, self.z)
    }
}

/// A 2‑D vector on the ground plane.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    /// Ground-plane x (world x).
    pub x: f32,
    /// Ground-plane y (world z).
    pub y: f32,
}

impl Point2 {
    /// Construct a new ground-plane point.
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    /// Euclidean length of the vector.
    pub fn length(&self) -> f32 {
        sqrtf(self.x * self.x + self.y * self.y)
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: Point2) -> f32 {
        (*self - other).length()
    }

    /// Unit vector in the same direction.
    ///
    /// Returns `None` for a zero-length or non-finite vector, where the
    /// direction is undefined.
    pub fn normalized(&self) -> Option<Point2> {
        let length = self.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(Point2::new(self.x / length, self.y / length))
    }

    /// Returns `true` if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point2 {
    type Output = Point2;

    fn mul(self, rhs: f32) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2 {
    type Output = Point2;

    fn neg(self) -> Point2 {
        Point2::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
