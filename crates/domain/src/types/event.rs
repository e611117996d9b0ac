//! Execution events and derived alerts

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::CustomerId;
use crate::impl_domain_status_conversions;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// One measured query execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    pub strategy_name: String,
    pub subject_id: CustomerId,
    pub duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionEvent {
    pub fn success(
        strategy_name: impl Into<String>,
        subject_id: CustomerId,
        duration: Duration,
    ) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            subject_id,
            duration_ms: duration_millis(duration),
            success: true,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(
        strategy_name: impl Into<String>,
        subject_id: CustomerId,
        duration: Duration,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            subject_id,
            duration_ms: duration_millis(duration),
            success: false,
            error_message: Some(error_message.into()),
            timestamp: Utc::now(),
        }
    }

    /// Whether this event should raise a query-error alert.
    pub fn has_error(&self) -> bool {
        !self.success || self.error_message.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SlowQuery,
    QueryError,
}

impl_domain_status_conversions!(AlertKind {
    SlowQuery => "slow_query",
    QueryError => "query_error",
});

/// Alert derived from a single [`ExecutionEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub source_event: ExecutionEvent,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn slow_query(event: &ExecutionEvent, threshold_ms: u64) -> Self {
        Self {
            kind: AlertKind::SlowQuery,
            message: format!(
                "{} took {}ms for customer {} (threshold {}ms)",
                event.strategy_name, event.duration_ms, event.subject_id, threshold_ms
            ),
            source_event: event.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn query_error(event: &ExecutionEvent) -> Self {
        let detail = event.error_message.as_deref().unwrap_or("unsuccessful execution");
        Self {
            kind: AlertKind::QueryError,
            message: format!(
                "{} failed for customer {}: {}",
                event.strategy_name, event.subject_id, detail
            ),
            source_event: event.clone(),
            timestamp: Utc::now(),
        }
    }
}
