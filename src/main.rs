use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fleet_router::adapters::outbound::init_combined_logger;
use fleet_router::{Config, OccupancyGrid, Planner, Position2D, Segment, SegmentGraph};

/// Corridor of three 1 m segments with a passing bay at the first junction.
fn demo_roadmap() -> Result<SegmentGraph> {
    let p = Position2D::new;
    let graph = SegmentGraph::new(vec![
        Segment::new(0, vec![p(0.0, 0.0), p(1.0, 0.0)], 1.0, vec![], vec![1, 3]),
        Segment::new(1, vec![p(1.0, 0.0), p(2.0, 0.0)], 1.0, vec![0, 3], vec![2]),
        Segment::new(2, vec![p(2.0, 0.0), p(3.0, 0.0)], 1.0, vec![1], vec![]),
        Segment::new(3, vec![p(1.0, 0.0), p(1.0, 1.0)], 1.0, vec![0, 1], vec![]),
    ])?;
    Ok(graph)
}

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("installing tracing subscriber")?;

    let logger = init_combined_logger(config.logging.file.as_deref(), &config.logging.level);
    info!(goal_mode = ?config.resolution.goal_mode, "starting fleet router demo");

    let graph = demo_roadmap()?;
    let map = OccupancyGrid::free(40, 20, 0.1, Position2D::new(-0.5, -0.5))?;

    let mut planner = Planner::with_config(2, config).with_logger(logger);
    planner.update_robot_pose(0, Position2D::new(0.2, 0.0))?;
    planner.update_robot_pose(1, Position2D::new(2.8, 0.0))?;
    planner.make_plan(
        &[Position2D::new(2.8, 0.0), Position2D::new(0.2, 0.0)],
        &[0.6, 0.6],
        &map,
        &graph,
    )?;

    let table = planner.routing_table().context("planner committed no table")?;
    info!(makespan = table.makespan(), "plan ready");
    println!("{}", serde_json::to_string_pretty(table)?);
    println!("{}", serde_json::to_string_pretty(planner.statistics())?);
    Ok(())
}
