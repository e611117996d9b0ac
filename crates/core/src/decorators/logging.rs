//! Logging decorator
//!
//! Reports the start and end of every call to a [`LogSink`]. Purely
//! observational: the inner result is returned untouched.

use std::sync::Arc;

use async_trait::async_trait;
use dashgate_common::error::{ErrorClassification, ErrorSeverity};
use dashgate_domain::{duration_millis, CustomerId, DashboardRecord, DashboardResult};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::query::DashboardQuery;

/// How a logged call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success { found: bool },
    Failure { kind: &'static str, severity: ErrorSeverity, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Started { strategy: String, customer_id: CustomerId },
    Finished { strategy: String, customer_id: CustomerId, duration_ms: u64, outcome: CallOutcome },
}

/// Destination for [`LoggingDecorator`] entries
pub trait LogSink: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// Writes entries through `tracing`, picking the level from the error
/// severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, entry: &LogEntry) {
        match entry {
            LogEntry::Started { strategy, customer_id } => {
                debug!(%strategy, customer_id, "Dashboard query started");
            }
            LogEntry::Finished {
                strategy,
                customer_id,
                duration_ms,
                outcome: CallOutcome::Success { found },
            } => {
                info!(%strategy, customer_id, duration_ms, found, "Dashboard query finished");
            }
            LogEntry::Finished {
                strategy,
                customer_id,
                duration_ms,
                outcome: CallOutcome::Failure { kind, severity, message },
            } => match severity {
                ErrorSeverity::Info => {
                    info!(%strategy, customer_id, duration_ms, kind, %message, "Dashboard query failed")
                }
                ErrorSeverity::Warning => {
                    warn!(%strategy, customer_id, duration_ms, kind, %message, "Dashboard query failed")
                }
                ErrorSeverity::Error | ErrorSeverity::Critical => {
                    error!(%strategy, customer_id, duration_ms, kind, %message, "Dashboard query failed")
                }
            },
        }
    }
}

pub struct LoggingDecorator {
    inner: Arc<dyn DashboardQuery>,
    sink: Arc<dyn LogSink>,
}

impl LoggingDecorator {
    pub fn new(inner: Arc<dyn DashboardQuery>, sink: Arc<dyn LogSink>) -> Self {
        Self { inner, sink }
    }

    /// Log through `tracing`
    pub fn with_tracing(inner: Arc<dyn DashboardQuery>) -> Self {
        Self::new(inner, Arc::new(TracingLogSink))
    }
}

#[async_trait]
impl DashboardQuery for LoggingDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        let strategy = self.name().to_string();
        self.sink.log(&LogEntry::Started { strategy: strategy.clone(), customer_id });

        let started = Instant::now();
        let result = self.inner.fetch(customer_id).await;

        let outcome = match &result {
            Ok(record) => CallOutcome::Success { found: record.is_found() },
            Err(err) => CallOutcome::Failure {
                kind: err.kind(),
                severity: err.severity(),
                message: err.to_string(),
            },
        };
        self.sink.log(&LogEntry::Finished {
            strategy,
            customer_id,
            duration_ms: duration_millis(started.elapsed()),
            outcome,
        });

        result
    }
}
