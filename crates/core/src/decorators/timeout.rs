//! Timeout decorator
//!
//! The inner call runs as its own tokio task and the decorator races the
//! task's handle against a timer. When the timer wins the handle is dropped,
//! which detaches the task: it runs to completion and its result is thrown
//! away. Nothing is cancelled downstream.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashgate_domain::{
    duration_millis, CustomerId, DashboardError, DashboardRecord, DashboardResult,
};
use tracing::{error, warn};

use crate::query::DashboardQuery;

pub struct TimeoutDecorator {
    inner: Arc<dyn DashboardQuery>,
    duration: Duration,
}

impl TimeoutDecorator {
    pub fn new(inner: Arc<dyn DashboardQuery>, duration: Duration) -> Self {
        Self { inner, duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl DashboardQuery for TimeoutDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.fetch(customer_id).await });

        match tokio::time::timeout(self.duration, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!(customer_id, error = %join_error, "Query task did not complete");
                Err(DashboardError::internal(format!("query task failed: {join_error}")))
            }
            Err(_) => {
                warn!(
                    customer_id,
                    timeout_ms = duration_millis(self.duration),
                    "Query timed out, abandoning inner call"
                );
                Err(DashboardError::Timeout { duration: self.duration })
            }
        }
    }
}
