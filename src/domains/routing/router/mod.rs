mod paths;
mod priority;
mod reservation;
mod schedule;
mod search;

use tracing::{debug, warn};

use self::paths::{independent_paths, IndependentPath};
use self::priority::PriorityOrders;
use self::reservation::ReservationTable;
use self::schedule::{build_table, find_conflicts, time_path, traversal_steps, Visit};
use self::search::{Blockers, SpaceTimeSearch};
use super::segment::SegmentGraph;
use super::types::{Conflict, RobotId, RoutingTable, SegmentId};
use crate::common::{DomainError, DomainResult};
use crate::config::RoutingConfig;

/// What the router needs to know about one robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotRequest {
    pub start: SegmentId,
    pub goal: SegmentId,
    pub radius: f64,
}

/// A robot that could not be planned under a priority order.
struct PlanFailure {
    robot: RobotId,
    blockers: Blockers,
    partial: Vec<Option<Vec<Visit>>>,
}

/// Schedules all robots on a shared roadmap so that no two robots with
/// incompatible footprints are on the same segment at the same time.
pub struct MultiRobotRouter<'g> {
    graph: &'g SegmentGraph,
    config: RoutingConfig,
    priority_attempts: u32,
    speed_attempts: u32,
    last_conflicts: Vec<Conflict>,
}

impl<'g> MultiRobotRouter<'g> {
    pub fn new(graph: &'g SegmentGraph, config: &RoutingConfig) -> Self {
        Self {
            graph,
            config: config.clone(),
            priority_attempts: 0,
            speed_attempts: 0,
            last_conflicts: Vec::new(),
        }
    }

    pub fn route(&mut self, requests: &[RobotRequest]) -> DomainResult<RoutingTable> {
        self.priority_attempts = 0;
        self.speed_attempts = 0;
        self.last_conflicts.clear();
        self.validate(requests)?;

        let radii: Vec<f64> = requests.iter().map(|r| r.radius).collect();
        let mut independent = Vec::with_capacity(requests.len());
        for (robot, (request, path)) in requests
            .iter()
            .zip(independent_paths(self.graph, requests, self.config.parallel_path_search))
            .enumerate()
        {
            let path = path.ok_or(DomainError::PathNotFound {
                robot,
                start: request.start,
                goal: request.goal,
            })?;
            debug!(robot, hops = path.segments.len(), length = path.length, "independent path");
            independent.push(path);
        }

        let nominal: Vec<Vec<Visit>> = independent
            .iter()
            .map(|p| time_path(self.graph, &p.segments, self.config.step_length, 1))
            .collect();
        let conflicts = find_conflicts(self.graph, &nominal, &radii);
        if conflicts.is_empty() {
            self.priority_attempts = 1;
            self.speed_attempts = 1;
            return Ok(build_table(self.graph, &nominal, &radii));
        }
        debug!(conflicts = conflicts.len(), "independent paths collide, scheduling by priority");
        self.last_conflicts = conflicts;

        let mut orders = PriorityOrders::new(requests.len(), self.config.priority_seed);
        let mut order = orders.first(requests.len());
        loop {
            self.priority_attempts += 1;
            let failed = match self.schedule_order(&order, requests, &independent) {
                Ok(schedule) => {
                    debug!(
                        priority_attempts = self.priority_attempts,
                        speed_attempts = self.speed_attempts,
                        ?order,
                        "schedule found"
                    );
                    return Ok(build_table(self.graph, &schedule, &radii));
                }
                Err(failed) => failed,
            };
            if self.priority_attempts >= self.config.max_priority_attempts {
                break;
            }
            match orders.next(&order, failed) {
                Some(next) => order = next,
                None => break,
            }
        }

        warn!(
            priority_attempts = self.priority_attempts,
            speed_attempts = self.speed_attempts,
            conflicts = self.last_conflicts.len(),
            "no collision free schedule found"
        );
        Err(DomainError::SchedulingExhausted {
            priority_attempts: self.priority_attempts,
            speed_attempts: self.speed_attempts,
            conflicts: self.last_conflicts.clone(),
        })
    }

    /// Number of priority orders tried by the last `route` call.
    pub fn priority_schedule_attempts(&self) -> u32 {
        self.priority_attempts
    }

    /// Number of prioritized plans (over all orders) of the last `route` call.
    pub fn speed_schedule_attempts(&self) -> u32 {
        self.speed_attempts
    }

    pub fn last_conflicts(&self) -> &[Conflict] {
        &self.last_conflicts
    }

    fn validate(&self, requests: &[RobotRequest]) -> DomainResult<()> {
        for (robot, r) in requests.iter().enumerate() {
            if !r.radius.is_finite() || r.radius <= 0.0 {
                return Err(DomainError::contract(format!(
                    "robot {robot} has radius {}",
                    r.radius
                )));
            }
            for id in [r.start, r.goal] {
                if !self.graph.contains(id) {
                    return Err(DomainError::contract(format!(
                        "robot {robot} refers to unknown segment {id}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Tries one priority order, slowing robots down between attempts.
    /// Returns the robot that failed last.
    fn schedule_order(
        &mut self,
        order: &[RobotId],
        requests: &[RobotRequest],
        independent: &[IndependentPath],
    ) -> Result<Vec<Vec<Visit>>, RobotId> {
        let radii: Vec<f64> = requests.iter().map(|r| r.radius).collect();
        let mut slowdown = vec![1u32; requests.len()];
        let mut failed = order.last().copied().unwrap_or_default();

        for _ in 0..self.config.max_speed_attempts {
            self.speed_attempts += 1;
            let failure = match self.plan_prioritized(order, requests, independent, &slowdown) {
                Ok(schedule) => {
                    let conflicts = find_conflicts(self.graph, &schedule, &radii);
                    if conflicts.is_empty() {
                        return Ok(schedule);
                    }
                    warn!(conflicts = conflicts.len(), ?order, "prioritized schedule failed replay");
                    self.last_conflicts = conflicts;
                    return Err(failed);
                }
                Err(failure) => failure,
            };

            failed = failure.robot;
            let attempt: Vec<Vec<Visit>> = failure
                .partial
                .into_iter()
                .enumerate()
                .map(|(robot, planned)| {
                    planned.unwrap_or_else(|| {
                        time_path(
                            self.graph,
                            &independent[robot].segments,
                            self.config.step_length,
                            slowdown[robot],
                        )
                    })
                })
                .collect();
            let conflicts = find_conflicts(self.graph, &attempt, &radii);
            if !conflicts.is_empty() {
                self.last_conflicts = conflicts;
            }
            debug!(robot = failed, blockers = ?failure.blockers, ?order, "robot could not be planned");

            if !self.slow_down_blocker(order, &failure.blockers, &mut slowdown) {
                break;
            }
        }
        Err(failed)
    }

    /// Plans the robots one by one, each against the reservations of the
    /// robots before it in `order`.
    fn plan_prioritized(
        &self,
        order: &[RobotId],
        requests: &[RobotRequest],
        independent: &[IndependentPath],
        slowdown: &[u32],
    ) -> Result<Vec<Vec<Visit>>, PlanFailure> {
        let mut reservations = ReservationTable::default();
        let mut planned: Vec<Option<Vec<Visit>>> = vec![None; requests.len()];

        for &robot in order {
            let request = &requests[robot];
            let horizon_span: u32 = self
                .graph
                .iter()
                .map(|s| traversal_steps(s, self.config.step_length, slowdown[robot]))
                .sum();
            let horizon = reservations.latest() + horizon_span + 1;
            let search = SpaceTimeSearch::new(
                self.graph,
                &reservations,
                request.radius,
                slowdown[robot],
                self.config.step_length,
                &independent[robot].hops_to_goal,
            );
            match search.plan(request.start, request.goal, horizon) {
                Ok(visits) => {
                    reservations.reserve(robot, request.radius, &visits);
                    planned[robot] = Some(visits);
                }
                Err(blockers) => {
                    return Err(PlanFailure {
                        robot,
                        blockers,
                        partial: planned,
                    })
                }
            }
        }
        Ok(planned.into_iter().flatten().collect())
    }

    /// Slows down the highest-priority robot among `blockers` that may still
    /// get slower. Returns false when none can.
    fn slow_down_blocker(&self, order: &[RobotId], blockers: &Blockers, slowdown: &mut [u32]) -> bool {
        let Some(&robot) = order
            .iter()
            .find(|r| blockers.contains_key(*r) && slowdown[**r] < self.config.max_slowdown)
        else {
            return false;
        };
        slowdown[robot] += 1;
        debug!(robot, slowdown = slowdown[robot], "slowing down blocking robot");
        true
    }
}
