use thiserror::Error;

use crate::domains::routing::{Conflict, ResolveError, RobotId, SegmentId};

/// Which pose of a robot failed to resolve onto the roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Robot {robot}: {endpoint} pose could not be resolved onto the roadmap: {source}")]
    ResolutionFailure {
        robot: RobotId,
        endpoint: Endpoint,
        #[source]
        source: ResolveError,
    },

    #[error("Robot {robot}: no path from segment {start} to segment {goal}")]
    PathNotFound {
        robot: RobotId,
        start: SegmentId,
        goal: SegmentId,
    },

    #[error("Scheduling exhausted after {priority_attempts} priority and {speed_attempts} speed attempts ({} conflicts left)", .conflicts.len())]
    SchedulingExhausted {
        priority_attempts: u32,
        speed_attempts: u32,
        conflicts: Vec<Conflict>,
    },

    #[error("Contract violation: {reason}")]
    ContractViolation { reason: String },

    #[error("Invalid graph: {reason}")]
    InvalidGraph { reason: String },

    #[error("Invalid map: {reason}")]
    InvalidMap { reason: String },
}

impl DomainError {
    pub(crate) fn contract(reason: impl Into<String>) -> Self {
        DomainError::ContractViolation {
            reason: reason.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
