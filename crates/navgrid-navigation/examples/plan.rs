use navgrid_navigation::astar::{SearchLimits, astar_search_detailed};
use navgrid_navigation::map::{BoxObstacles, CellCoord, NavGrid, ObstacleBox};
use navgrid_navigation::{Point2, WorldPoint, build_turn_lines};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .init();

    println!("Grid Planning Example");
    println!("=====================");

    // A wall across the middle with a gap at one end, plus a few random boxes
    let mut boxes = vec![ObstacleBox::new(Point2::new(0.0, -1.0), Point2::new(0.25, 3.0))];
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..4 {
        let center = Point2::new(rng.random_range(-4.0..4.0), rng.random_range(-4.0..4.0));
        boxes.push(ObstacleBox::new(center, Point2::new(0.3, 0.3)));
    }
    let obstacles = BoxObstacles::new(boxes);

    let grid = NavGrid::build(WorldPoint::default(), 10.0, 10.0, 0.5, &obstacles)?;
    println!("\n{}", grid);

    let origin = WorldPoint::on_ground(-4.5, -4.5);
    let destination = WorldPoint::on_ground(4.5, -4.0);
    let origin_cell = grid.world_to_cell(origin).coord();
    let destination_cell = grid.world_to_cell(destination).coord();
    println!("Origin {} -> cell {}", origin, origin_cell);
    println!("Destination {} -> cell {}", destination, destination_cell);

    let result = astar_search_detailed(
        &grid,
        origin_cell,
        destination_cell,
        SearchLimits::unbounded(),
    );
    println!("\n{}", result);

    let coords: Vec<CellCoord> = result.into_path();
    if coords.is_empty() {
        println!("Destination is unreachable.");
        return Ok(());
    }

    println!("\nPath visualization:");
    print!("{}", grid.render_path(&coords));

    let cells = coords
        .iter()
        .map(|&coord| grid.cell(coord))
        .collect::<Result<Vec<_>, _>>()?;
    let lines = build_turn_lines(&cells, origin, 0.2)?;

    println!("\nTurn lines:");
    for (i, (cell, line)) in cells.iter().zip(lines.iter()).enumerate() {
        println!(
            "  {:>2}: cell {} turn point {} {}",
            i,
            cell.coord(),
            line.point(),
            if line.is_vertical() {
                "vertical".to_string()
            } else {
                format!("gradient {:.2}", line.gradient())
            }
        );
    }

    Ok(())
}
