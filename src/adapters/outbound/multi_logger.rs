use std::sync::Arc;

use crate::common::DomainError;
use crate::domains::logger::{DomainLogger, DynLogger};
use crate::domains::routing::RunStatistics;

/// Fans every message and run report out to several loggers.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }

    // Forwarded so that sinks overriding the reports keep their own format.
    fn plan_finished(&self, statistics: &RunStatistics) {
        self.sinks.iter().for_each(|s| s.plan_finished(statistics));
    }

    fn plan_failed(&self, error: &DomainError, statistics: &RunStatistics) {
        self.sinks.iter().for_each(|s| s.plan_failed(error, statistics));
    }
}

/// Console logger, plus the file logger when `file` is set and can be
/// opened.
pub fn init_combined_logger(file: Option<&str>, level: &str) -> DynLogger {
    let mut sinks = vec![super::init_console_logger()];
    if let Some(path) = file {
        match super::init_file_logger(path, level) {
            Ok(file_logger) => sinks.push(file_logger),
            Err(e) => tracing::warn!(error = %e, path, "file logger unavailable"),
        }
    }
    Arc::new(MultiLogger::new(sinks))
}
