use navgrid_navigation::{Point2, WorldPoint};

use crate::blackboard::AgentPose;

/// A point agent that turns toward its target and then moves forward.
///
/// Motion is confined to the ground plane; the height of the starting
/// position is carried through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Agent {
    position: Point2,
    height: f32,
    heading: Point2,
}

impl Agent {
    /// Places the agent at `position`, facing `heading`. A zero heading faces +x.
    pub fn new(position: WorldPoint, heading: Point2) -> Self {
        Agent {
            position: position.ground(),
            height: position.y,
            heading: heading.normalized().unwrap_or(Point2::new(1.0, 0.0)),
        }
    }

    pub fn ground(&self) -> Point2 {
        self.position
    }

    pub fn heading(&self) -> Point2 {
        self.heading
    }

    pub fn pose(&self) -> AgentPose {
        AgentPose {
            position: WorldPoint::new(self.position.x, self.height, self.position.y),
            heading: self.heading,
        }
    }

    /// Advances the agent by one tick of length `dt` seconds.
    ///
    /// The heading is blended toward the target by `dt * turn_speed` (capped
    /// at 1), then the agent moves `speed * dt` along the new heading.
    pub fn step(&mut self, target: Point2, dt: f32, speed: f32, turn_speed: f32) {
        if let Some(desired) = (target - self.position).normalized() {
            let blend = (dt * turn_speed).min(1.0);
            let mixed = self.heading + (desired - self.heading) * blend;
            // Opposite headings can cancel out mid-blend.
            self.heading = mixed.normalized().unwrap_or(desired);
        }
        self.position = self.position + self.heading * (speed * dt);
    }
}
