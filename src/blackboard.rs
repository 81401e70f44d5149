use navgrid_navigation::{Point2, WorldPoint};
use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

/// Position and facing of the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPose {
    pub position: WorldPoint,
    /// Unit ground-plane heading.
    pub heading: Point2,
}

#[derive(Debug, Clone)]
pub struct State {
    pub pose: AgentPose,
    /// Index of the waypoint the agent is steering toward.
    pub target_index: usize,
    pub waypoints: usize,
    pub arrived: bool,
    pub last_update_ts: Instant,
    pub faults: Vec<String>,
}

impl State {
    pub fn new(pose: AgentPose, waypoints: usize) -> Self {
        State {
            pose,
            target_index: 0,
            waypoints,
            arrived: waypoints == 0,
            last_update_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

/// Records the latest pose and progress from the follow loop.
pub fn record_progress(bb: &Blackboard, pose: AgentPose, target_index: usize, arrived: bool) {
    let mut g = bb.write();
    g.pose = pose;
    g.target_index = target_index;
    g.arrived = arrived;
    g.last_update_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
