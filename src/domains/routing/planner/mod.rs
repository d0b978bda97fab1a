mod planner;
mod statistics;

pub use planner::Planner;
pub use statistics::RunStatistics;
