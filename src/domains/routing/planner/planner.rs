use std::time::Instant;

use tracing::{debug, info, warn};

use super::statistics::RunStatistics;
use crate::common::{DomainError, DomainResult, Endpoint};
use crate::config::{Config, GoalMode, GraphMode};
use crate::domains::logger::DynLogger;
use crate::domains::routing::grid::OccupancyGrid;
use crate::domains::routing::resolver::PointResolver;
use crate::domains::routing::router::{MultiRobotRouter, RobotRequest};
use crate::domains::routing::segment::SegmentGraph;
use crate::domains::routing::trimmer::trim_graph;
use crate::domains::routing::types::{Checkpoint, Position2D, RobotId, RobotState, RoutingTable};

/// Owns the fleet state between planning runs and turns poses and goals
/// into a committed routing table.
pub struct Planner {
    robots: Vec<RobotState>,
    config: Config,
    routing_table: Option<RoutingTable>,
    statistics: RunStatistics,
    potential: Vec<f64>,
    logger: Option<DynLogger>,
}

impl Planner {
    pub fn new(robot_count: usize) -> Self {
        Self::with_config(robot_count, Config::default())
    }

    pub fn with_config(robot_count: usize, config: Config) -> Self {
        Self {
            robots: (0..robot_count).map(RobotState::new).collect(),
            config,
            routing_table: None,
            statistics: RunStatistics::default(),
            potential: Vec::new(),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: DynLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Changes the fleet size. Robots below `robot_count` keep their pose,
    /// goal and radius; every resolution, the routing table and the run
    /// metrics are dropped.
    pub fn resize(&mut self, robot_count: usize) {
        self.robots.truncate(robot_count);
        let existing = self.robots.len();
        self.robots.extend((existing..robot_count).map(RobotState::new));
        for robot in &mut self.robots {
            robot.clear_resolution();
        }
        self.routing_table = None;
        self.statistics = RunStatistics::default();
        self.potential.clear();
        debug!(robot_count, "planner resized");
    }

    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    pub fn robot(&self, id: RobotId) -> Option<&RobotState> {
        self.robots.get(id)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn update_robot_pose(&mut self, id: RobotId, pose: Position2D) -> DomainResult<()> {
        let count = self.robots.len();
        let robot = self
            .robots
            .get_mut(id)
            .ok_or_else(|| DomainError::contract(format!("robot {id} out of range (fleet of {count})")))?;
        robot.pose = pose;
        robot.pose_received = true;
        Ok(())
    }

    /// Plans routes for the whole fleet. Either every robot gets a route or
    /// none does: on failure the previous table is dropped while the attempt
    /// counters and duration stay readable.
    pub fn make_plan(
        &mut self,
        goals: &[Position2D],
        radii: &[f64],
        map: &OccupancyGrid,
        graph: &SegmentGraph,
    ) -> DomainResult<()> {
        let started = Instant::now();
        let mut statistics = RunStatistics::begin();
        self.routing_table = None;

        let result = self.plan(goals, radii, map, graph, &mut statistics);
        statistics.duration_ms = started.elapsed().as_millis() as u64;
        self.statistics = statistics;

        match result {
            Ok(table) => {
                self.routing_table = Some(table);
                self.postprocess_routing_table();
                info!(
                    robots = self.robots.len(),
                    duration_ms = self.statistics.duration_ms,
                    overall_path_length = self.statistics.overall_path_length,
                    "routing table committed"
                );
                if let Some(logger) = &self.logger {
                    logger.plan_finished(&self.statistics);
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "planning failed");
                if let Some(logger) = &self.logger {
                    logger.plan_failed(&e, &self.statistics);
                }
                Err(e)
            }
        }
    }

    fn plan(
        &mut self,
        goals: &[Position2D],
        radii: &[f64],
        map: &OccupancyGrid,
        graph: &SegmentGraph,
        statistics: &mut RunStatistics,
    ) -> DomainResult<RoutingTable> {
        let count = self.robots.len();
        if goals.len() != count || radii.len() != count {
            return Err(DomainError::contract(format!(
                "expected {count} goals and radii, got {} goals and {} radii",
                goals.len(),
                radii.len()
            )));
        }
        if let Some(robot) = radii.iter().position(|r| !r.is_finite() || *r <= 0.0) {
            return Err(DomainError::contract(format!(
                "robot {robot} has radius {}",
                radii[robot]
            )));
        }
        if let Some(robot) = self.robots.iter().find(|r| !r.pose_received) {
            return Err(DomainError::contract(format!("robot {} has not received a pose", robot.id)));
        }

        for (robot, (goal, radius)) in self.robots.iter_mut().zip(goals.iter().zip(radii)) {
            robot.goal = *goal;
            robot.radius = *radius;
            robot.clear_resolution();
        }

        let resolution = &self.config.resolution;
        let smallest = radii.iter().copied().fold(f64::INFINITY, f64::min);
        let threshold = resolution.min_segment_diameter.max(smallest);
        let narrowest = graph.width_range().map_or(f64::INFINITY, |(lo, _)| lo);
        let trimmed;
        let resolution_graph = if resolution.min_segment_diameter > 0.0 && narrowest < threshold {
            trimmed = trim_graph(graph, threshold);
            &trimmed
        } else {
            graph
        };
        let mode = match (resolution.graph_mode, resolution.goal_mode) {
            (GraphMode::Random, GoalMode::UseVoronoiGoal) => GoalMode::UseMapGoal,
            (_, mode) => mode,
        };

        let mut resolver = PointResolver::new(resolution_graph, map, resolution);
        for robot in self.robots.iter_mut() {
            let start = resolver
                .resolve(&robot.pose, robot.radius, mode)
                .map_err(|source| DomainError::ResolutionFailure {
                    robot: robot.id,
                    endpoint: Endpoint::Start,
                    source,
                })?;
            let goal = resolver
                .resolve(&robot.goal, robot.radius, mode)
                .map_err(|source| DomainError::ResolutionFailure {
                    robot: robot.id,
                    endpoint: Endpoint::Goal,
                    source,
                })?;
            debug!(robot = robot.id, start = start.segment, goal = goal.segment, "poses resolved");
            robot.start_segment = Some(start.segment);
            robot.snapped_start = Some(start.point);
            robot.goal_segment = Some(goal.segment);
            robot.snapped_goal = Some(goal.point);
        }
        self.potential = resolver.into_potential();

        let requests: Vec<RobotRequest> = self
            .robots
            .iter()
            .filter_map(|r| {
                Some(RobotRequest {
                    start: r.start_segment?,
                    goal: r.goal_segment?,
                    radius: r.radius,
                })
            })
            .collect();

        let mut router = MultiRobotRouter::new(graph, &self.config.routing);
        let result = router.route(&requests);
        statistics.priority_schedule_attempts = router.priority_schedule_attempts();
        statistics.speed_schedule_attempts = router.speed_schedule_attempts();
        result
    }

    /// The committed route of one robot.
    pub fn get_route(&self, id: RobotId) -> DomainResult<&[Checkpoint]> {
        let table = self
            .routing_table
            .as_ref()
            .ok_or_else(|| DomainError::contract("no routing table has been committed"))?;
        table
            .route(id)
            .ok_or_else(|| DomainError::contract(format!("robot {id} out of range (fleet of {})", table.len())))
    }

    pub fn routing_table(&self) -> Option<&RoutingTable> {
        self.routing_table.as_ref()
    }

    /// Recomputes the path length metrics from the committed table.
    pub fn postprocess_routing_table(&mut self) {
        let Some(table) = &self.routing_table else { return };
        let lengths: Vec<f64> = (0..table.len()).filter_map(|id| table.path_length(id)).collect();
        self.statistics.overall_path_length = lengths.iter().sum();
        self.statistics.longest_path_length = lengths.iter().copied().fold(0.0, f64::max);
    }

    pub fn duration_ms(&self) -> u64 {
        self.statistics.duration_ms
    }

    pub fn overall_path_length(&self) -> f64 {
        self.statistics.overall_path_length
    }

    pub fn longest_path_length(&self) -> f64 {
        self.statistics.longest_path_length
    }

    pub fn priority_schedule_attempts(&self) -> u32 {
        self.statistics.priority_schedule_attempts
    }

    pub fn speed_schedule_attempts(&self) -> u32 {
        self.statistics.speed_schedule_attempts
    }

    /// Wavefront potential of the last pose resolved by a voronoi or map
    /// wavefront, one value per map cell. Empty otherwise.
    pub fn potential(&self) -> &[f64] {
        &self.potential
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }
}
