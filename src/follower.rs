use navgrid_navigation::{
    Cell, NavigationError, Point2, TurnLine, WorldPoint, build_turn_lines_from_points,
};

/// Walks a planned path one waypoint at a time.
///
/// The current waypoint is retired once the agent crosses its turn line.
/// The follower never decides how the agent moves; the caller steps the agent
/// and reports each new position through [`PathFollower::advance`].
#[derive(Debug, Clone)]
pub struct PathFollower {
    targets: Vec<Point2>,
    lines: Vec<TurnLine>,
    index: usize,
}

impl PathFollower {
    /// Builds a follower for a cell path starting from `origin`.
    pub fn new(
        path: &[&Cell],
        origin: WorldPoint,
        turn_distance: f32,
    ) -> Result<Self, NavigationError> {
        let targets: Vec<Point2> = path.iter().map(|cell| cell.ground()).collect();
        Self::from_points(targets, origin.ground(), turn_distance)
    }

    pub fn from_points(
        targets: Vec<Point2>,
        origin: Point2,
        turn_distance: f32,
    ) -> Result<Self, NavigationError> {
        let lines = build_turn_lines_from_points(&targets, origin, turn_distance)?;
        Ok(PathFollower {
            targets,
            lines,
            index: 0,
        })
    }

    /// Retires every waypoint whose turn line `position` has crossed and
    /// returns how many were retired.
    pub fn advance(&mut self, position: Point2) -> usize {
        let start = self.index;
        while self
            .lines
            .get(self.index)
            .is_some_and(|line| line.crossed_line(position))
        {
            self.index += 1;
        }
        self.index - start
    }

    pub fn current_target(&self) -> Option<Point2> {
        self.targets.get(self.index).copied()
    }

    /// Distance from `position` to the current turn line.
    pub fn distance_to_turn(&self, position: Point2) -> Option<f32> {
        self.lines
            .get(self.index)
            .map(|line| line.distance_from_point(position))
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.targets.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn waypoints(&self) -> usize {
        self.targets.len()
    }
}
