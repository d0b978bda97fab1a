use std::sync::Arc;

use crate::domains::logger::{DomainLogger, DynLogger};

/// Writes run reports to stdout, errors to stderr.
struct ConsoleLogger {
    prefix: String,
}

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("{}{}", self.prefix, msg);
    }

    fn warn(&self, msg: &str) {
        println!("{}WARN: {}", self.prefix, msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{}ERROR: {}", self.prefix, msg);
    }
}

pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleLogger {
        prefix: "[fleet-router] ".to_string(),
    })
}
