use std::sync::Arc;

use crate::common::DomainError;
use crate::domains::routing::RunStatistics;

/// Logging port of the planner. Adapters decide where run reports end up;
/// logging never fails from the planner's point of view.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);

    fn plan_finished(&self, statistics: &RunStatistics) {
        self.info(&format!(
            "plan {} finished in {} ms: overall length {:.2} m, longest {:.2} m, {} priority / {} speed attempts",
            run_label(statistics),
            statistics.duration_ms,
            statistics.overall_path_length,
            statistics.longest_path_length,
            statistics.priority_schedule_attempts,
            statistics.speed_schedule_attempts,
        ));
    }

    fn plan_failed(&self, error: &DomainError, statistics: &RunStatistics) {
        self.error(&format!(
            "plan {} failed after {} ms ({} priority / {} speed attempts): {}",
            run_label(statistics),
            statistics.duration_ms,
            statistics.priority_schedule_attempts,
            statistics.speed_schedule_attempts,
            error,
        ));
    }
}

pub type DynLogger = Arc<dyn DomainLogger>;

fn run_label(statistics: &RunStatistics) -> String {
    statistics
        .run_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}
