//! Performance monitoring hub
//!
//! [`PerformanceMonitor`] records [`ExecutionEvent`]s, derives alerts from
//! them and fans both out to subscribed [`PerformanceObserver`]s.

pub mod observers;
pub mod performance_monitor;

use dashgate_domain::{Alert, ExecutionEvent};
use thiserror::Error;

pub use observers::{AggregateSnapshot, AggregatorObserver, ConsoleObserver, StrategyTally};
pub use performance_monitor::{PerformanceMonitor, SubscriptionId};

/// What an observer is told about
#[derive(Debug, Clone, Copy)]
pub enum MonitorNotification<'a> {
    Event(&'a ExecutionEvent),
    Alert(&'a Alert),
}

/// Failure reported by an observer; logged by the monitor, never propagated
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Observer failed: {message}")]
    Failed { message: String },

    #[error("Observer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Observer serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sink for monitor notifications
///
/// Called synchronously from `record_event`, so implementations should be
/// quick. Errors and panics are contained per observer.
pub trait PerformanceObserver: Send + Sync {
    fn name(&self) -> &str;

    fn update(&self, notification: &MonitorNotification<'_>) -> Result<(), ObserverError>;
}
