use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use navgrid_navigation::{CellCoord, NavGrid};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::agent::Agent;
use crate::blackboard::{AgentPose, Blackboard, State, raise_fault, record_progress, snapshot};
use crate::bus::Topic;
use crate::follower::PathFollower;
use crate::settings::AgentSettings;

/// How often the watchdog checks on the follow loop.
const WATCHDOG_PERIOD: Duration = Duration::from_millis(50);

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct Report {
    pub final_state: State,
    pub ticks: u64,
    pub cells_visited: usize,
}

/// Drives `agent` along the follower's path until it arrives or the watchdog
/// times out.
pub async fn run(
    grid: Arc<NavGrid>,
    follower: PathFollower,
    agent: Agent,
    settings: AgentSettings,
) -> anyhow::Result<Report> {
    info!(
        waypoints = follower.waypoints(),
        tick_hz = settings.tick_hz,
        "Simulation started."
    );
    if follower.is_finished() {
        info!("Route has no waypoints; the agent is already there.");
    }
    let bb: Blackboard = Arc::new(RwLock::new(State::new(agent.pose(), follower.waypoints())));
    let pose_topic: Topic<AgentPose> = Topic::new(16);
    let pose_rx = pose_topic.subscribe();

    let (ticks, cells_visited, ()) = tokio::try_join!(
        follow_task(bb.clone(), follower, agent, settings, pose_topic),
        monitor_task(grid, pose_rx),
        watchdog(bb.clone(), settings),
    )?;

    info!(ticks, cells_visited, "Simulation finished.");
    Ok(Report {
        final_state: snapshot(&bb),
        ticks,
        cells_visited,
    })
}

/// Steps the agent at `tick_hz`, retiring waypoints as their turn lines are
/// crossed. Returns the number of ticks taken. Dropping `pose_topic` on return
/// tells the monitor to finish.
async fn follow_task(
    bb: Blackboard,
    mut follower: PathFollower,
    mut agent: Agent,
    settings: AgentSettings,
    pose_topic: Topic<AgentPose>,
) -> anyhow::Result<u64> {
    let dt = 1.0 / settings.tick_hz as f32;
    let mut ticker = time::interval(Duration::from_secs_f32(dt));
    let mut ticks: u64 = 0;

    loop {
        ticker.tick().await;

        let position = agent.ground();
        if follower.advance(position) > 0 {
            info!(
                index = follower.index(),
                waypoints = follower.waypoints(),
                %position,
                "Turn line crossed"
            );
        }

        let Some(target) = follower.current_target() else {
            record_progress(&bb, agent.pose(), follower.index(), true);
            info!(ticks, position = %agent.pose().position, "Destination reached");
            return Ok(ticks);
        };

        agent.step(target, dt, settings.speed, settings.turn_speed);
        ticks += 1;
        debug!(
            %target,
            heading = %agent.heading(),
            distance_to_turn = ?follower.distance_to_turn(agent.ground()),
            "Agent stepped"
        );

        let pose = agent.pose();
        pose_topic.publish(pose);
        record_progress(&bb, pose, follower.index(), false);
    }
}

/// Logs every cell the agent enters. Returns the number of cell transitions
/// once the pose topic closes.
async fn monitor_task(
    grid: Arc<NavGrid>,
    mut pose_rx: broadcast::Receiver<Arc<AgentPose>>,
) -> anyhow::Result<usize> {
    let mut current: Option<CellCoord> = None;
    let mut cells_visited = 0;

    loop {
        match pose_rx.recv().await {
            Ok(pose) => {
                let cell = grid.world_to_cell(pose.position);
                if current == Some(cell.coord()) {
                    continue;
                }
                current = Some(cell.coord());
                cells_visited += 1;
                if cell.is_blocked() {
                    warn!(cell = %cell.coord(), "Agent entered a blocked cell");
                } else {
                    debug!(cell = %cell.coord(), "Agent entered cell");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Pose receiver lagged by {} messages in monitor_task.", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Pose topic closed, monitor finished.");
                return Ok(cells_visited);
            }
        }
    }
}

/// Fails the run if the agent has not arrived within `timeout_secs`. Warns
/// when the follow loop stops reporting for longer than ten ticks.
async fn watchdog(bb: Blackboard, settings: AgentSettings) -> anyhow::Result<()> {
    let started = Instant::now();
    let timeout = Duration::from_secs(settings.timeout_secs);
    let stall = Duration::from_secs_f32(10.0 / settings.tick_hz as f32);
    let mut tick = time::interval(WATCHDOG_PERIOD);

    loop {
        tick.tick().await;
        let state = snapshot(&bb);
        if state.arrived {
            return Ok(());
        }

        let age = state.last_update_ts.elapsed();
        if age > stall {
            warn!(?age, "Follow loop has not reported recently.");
        }

        if started.elapsed() > timeout {
            error!(
                target_index = state.target_index,
                waypoints = state.waypoints,
                "Destination not reached before timeout."
            );
            raise_fault(&bb, "route timeout");
            return Err(anyhow!(
                "agent did not arrive within {}s (waypoint {} of {})",
                settings.timeout_secs,
                state.target_index,
                state.waypoints
            ));
        }
    }
}
