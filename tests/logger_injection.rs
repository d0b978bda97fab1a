use std::sync::{Arc, Mutex};

use fleet_router::adapters::outbound::{init_noop_logger, MultiLogger};
use fleet_router::domains::logger::{DomainLogger, DynLogger};
use fleet_router::{DomainError, Planner, Position2D, RunStatistics};

mod common;

#[derive(Default)]
struct BridgeCapture {
    messages: Mutex<Vec<String>>,
}

impl BridgeCapture {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("INFO:{}", msg));
    }
    fn warn(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("WARN:{}", msg));
    }
    fn error(&self, msg: &str) {
        self.messages.lock().unwrap().push(format!("ERR:{}", msg));
    }
}

/// Keeps the raw run reports instead of formatted messages.
#[derive(Default)]
struct ReportCapture {
    finished: Mutex<Vec<RunStatistics>>,
    failed: Mutex<Vec<String>>,
}

impl DomainLogger for ReportCapture {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}

    fn plan_finished(&self, statistics: &RunStatistics) {
        self.finished.lock().unwrap().push(statistics.clone());
    }

    fn plan_failed(&self, error: &DomainError, _statistics: &RunStatistics) {
        self.failed.lock().unwrap().push(error.to_string());
    }
}

fn planner_with(logger: DynLogger) -> Planner {
    let mut planner = Planner::new(2).with_logger(logger);
    planner.update_robot_pose(0, Position2D::new(0.2, 0.0)).unwrap();
    planner.update_robot_pose(1, Position2D::new(2.8, 0.0)).unwrap();
    planner
}

const GOALS: [Position2D; 2] = [Position2D { x: 2.8, y: 0.0 }, Position2D { x: 0.2, y: 0.0 }];

#[test]
fn successful_plan_is_reported() {
    let capture = Arc::new(BridgeCapture::default());
    let mut planner = planner_with(capture.clone());

    planner
        .make_plan(&GOALS, &[0.6, 0.6], &common::corridor_map(), &common::corridor_with_bay())
        .unwrap();

    let messages = capture.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("INFO:plan "));
    assert!(messages[0].contains("finished"));
}

#[test]
fn failed_plan_is_reported() {
    let capture = Arc::new(BridgeCapture::default());
    let mut planner = planner_with(capture.clone());

    let _ = planner.make_plan(&GOALS, &[0.6, 0.6], &common::corridor_map(), &common::corridor());

    let messages = capture.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("ERR:plan "));
    assert!(messages[0].contains("Scheduling exhausted"));
}

#[test]
fn multi_logger_fans_out_reports() {
    let reports = Arc::new(ReportCapture::default());
    let plain = Arc::new(BridgeCapture::default());
    let multi = MultiLogger::new(vec![reports.clone() as DynLogger, plain.clone() as DynLogger, init_noop_logger()]);
    assert_eq!(multi.len(), 3);
    let mut planner = planner_with(Arc::new(multi));

    planner
        .make_plan(&GOALS, &[0.6, 0.6], &common::corridor_map(), &common::corridor_with_bay())
        .unwrap();
    let _ = planner.make_plan(&GOALS, &[0.6, 0.6], &common::corridor_map(), &common::corridor());

    let finished = reports.finished.lock().unwrap();
    assert_eq!(finished.len(), 1);
    assert!(finished[0].overall_path_length > 0.0);
    assert_eq!(reports.failed.lock().unwrap().len(), 1);
    assert_eq!(plain.messages().len(), 2);
}

#[test]
fn noop_logger_accepts_everything() {
    let noop = init_noop_logger();
    noop.info("ignored");
    noop.warn("ignored");
    noop.error("ignored");
    noop.plan_finished(&RunStatistics::default());
}
