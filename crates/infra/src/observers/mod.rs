//! Durable monitor observers and monitor assembly

pub mod file_log;

use std::sync::Arc;

use dashgate_core::monitor::{ConsoleObserver, PerformanceMonitor};
use dashgate_domain::MonitorConfig;
pub use file_log::FileLogObserver;

use crate::errors::InfraResult;

/// Build a monitor with the console observer and, when `log_path` is set,
/// a [`FileLogObserver`] subscribed after it.
pub fn monitor_from_config(config: &MonitorConfig) -> InfraResult<Arc<PerformanceMonitor>> {
    let monitor = Arc::new(PerformanceMonitor::new(config));
    monitor.subscribe(Arc::new(ConsoleObserver));

    if let Some(path) = &config.log_path {
        monitor.subscribe(Arc::new(FileLogObserver::open(path)?));
    }
    Ok(monitor)
}
