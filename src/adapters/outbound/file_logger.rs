use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use log::LevelFilter;

use crate::domains::logger::{DomainLogger, DynLogger};

/// Forwards to the `log` facade, which `fast_log` writes to the log file.
struct FastLogBridge;

impl DomainLogger for FastLogBridge {
    fn info(&self, msg: &str) {
        log::info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log::error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Installs `fast_log` as the global `log` backend writing to `path`.
/// Can succeed only once per process.
pub fn init_file_logger(path: &str, level: &str) -> Result<DynLogger, String> {
    let level = LevelFilter::from_str(level).map_err(|e| format!("invalid log level {level:?}: {e}"))?;
    fast_log::init(fast_log::config::Config::new().file(path).level(level))
        .map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FastLogBridge))
}
