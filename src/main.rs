mod agent; // simulated point agent
mod blackboard; // shared run state
mod bus; // broadcast topics between tasks
mod follower; // turn-line driven waypoint tracking
mod settings; // config file + environment overrides
mod simulation; // tokio tasks driving the agent

use std::sync::Arc;

use anyhow::Context;
use navgrid_navigation::astar::find_path_detailed;
use navgrid_navigation::{BoxObstacles, Cell, NavGrid};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use agent::Agent;
use follower::PathFollower;
use settings::{DEFAULT_CONFIG_PATH, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Navgrid demo started.");
    match run().await {
        Ok(()) => {
            info!("Navgrid demo finished successfully.");
            Ok(())
        }
        Err(e) => {
            error!("Navgrid demo failed: {:?}", e);
            Err(e)
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = load_settings(&config_path)
        .with_context(|| format!("failed to load settings from {config_path}"))?;

    let obstacles = BoxObstacles::new(settings.obstacles.clone());
    let grid = NavGrid::build(
        settings.grid.center,
        settings.grid.width,
        settings.grid.depth,
        settings.grid.cell_size,
        &obstacles,
    )
    .context("failed to build navigation grid")?;
    info!("\n{}", grid);

    let origin = settings.route.origin;
    let destination = settings.route.destination;
    let result = find_path_detailed(&grid, origin, destination, settings.search);
    info!(%origin, %destination, "{}", result);

    let coords = result.into_path();
    if coords.is_empty() {
        warn!("No route to the destination; nothing to follow.");
        return Ok(());
    }
    info!("Planned route:\n{}", grid.render_path(&coords));

    let cells = coords
        .iter()
        .map(|&coord| grid.cell(coord))
        .collect::<Result<Vec<&Cell>, _>>()?;
    let follower = PathFollower::new(&cells, origin, settings.agent.turn_distance)
        .context("failed to build turn lines")?;

    let initial_heading = follower
        .current_target()
        .map(|target| target - origin.ground())
        .unwrap_or_default();
    let agent = Agent::new(origin, initial_heading);

    let report = simulation::run(Arc::new(grid), follower, agent, settings.agent).await?;
    info!(
        ticks = report.ticks,
        cells_visited = report.cells_visited,
        final_position = %report.final_state.pose.position,
        final_heading = %report.final_state.pose.heading,
        "Route complete"
    );
    Ok(())
}
