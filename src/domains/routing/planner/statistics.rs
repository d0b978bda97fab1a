use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metrics of the most recent planning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub overall_path_length: f64,
    pub longest_path_length: f64,
    pub priority_schedule_attempts: u32,
    pub speed_schedule_attempts: u32,
}

impl RunStatistics {
    pub(crate) fn begin() -> Self {
        Self {
            run_id: Some(Uuid::new_v4()),
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }
}
