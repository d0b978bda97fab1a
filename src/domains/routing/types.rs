use serde::{Deserialize, Serialize};

pub type RobotId = usize;
pub type SegmentId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Everything the planner knows about one robot between two planning runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotState {
    pub id: RobotId,
    pub pose: Position2D,
    pub goal: Position2D,
    pub radius: f64,
    pub pose_received: bool,
    pub start_segment: Option<SegmentId>,
    pub goal_segment: Option<SegmentId>,
    /// Point on the roadmap (or map) the pose was snapped to.
    pub snapped_start: Option<Position2D>,
    pub snapped_goal: Option<Position2D>,
}

impl RobotState {
    pub fn new(id: RobotId) -> Self {
        Self {
            id,
            pose: Position2D::default(),
            goal: Position2D::default(),
            radius: 0.0,
            pose_received: false,
            start_segment: None,
            goal_segment: None,
            snapped_start: None,
            snapped_goal: None,
        }
    }

    pub fn clear_resolution(&mut self) {
        self.start_segment = None;
        self.goal_segment = None;
        self.snapped_start = None;
        self.snapped_goal = None;
    }
}

/// Another robot must have reached `step` of its own route before the
/// checkpoint carrying this precondition may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precondition {
    pub robot: RobotId,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub step: usize,
    pub segment: SegmentId,
    pub position: Position2D,
    pub segment_length: f64,
    pub arrival: u32,
    /// `None` on the last checkpoint: the robot stays there.
    pub departure: Option<u32>,
    pub preconditions: Vec<Precondition>,
}

/// Two robots whose footprints do not fit side by side on `segment`
/// occupy it at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub segment: SegmentId,
    pub robots: (RobotId, RobotId),
    pub time: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingTable {
    routes: Vec<Vec<Checkpoint>>,
}

impl RoutingTable {
    pub fn new(routes: Vec<Vec<Checkpoint>>) -> Self {
        Self { routes }
    }

    pub fn route(&self, robot: RobotId) -> Option<&[Checkpoint]> {
        self.routes.get(robot).map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RobotId, &[Checkpoint])> {
        self.routes.iter().enumerate().map(|(id, r)| (id, r.as_slice()))
    }

    /// Roadmap distance from the midpoint of the first segment to the
    /// midpoint of the last one.
    pub fn path_length(&self, robot: RobotId) -> Option<f64> {
        let route = self.routes.get(robot)?;
        Some(
            route
                .windows(2)
                .map(|w| 0.5 * (w[0].segment_length + w[1].segment_length))
                .sum(),
        )
    }

    /// Time step at which the last robot arrives at its goal.
    pub fn makespan(&self) -> u32 {
        self.routes
            .iter()
            .filter_map(|r| r.last())
            .map(|c| c.arrival)
            .max()
            .unwrap_or(0)
    }
}
