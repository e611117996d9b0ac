//! Metrics decorator
//!
//! Records a latency sample and an outcome for every call, successful or
//! not, until [`MetricsDecorator::reset`]. Latency is measured with the
//! tokio clock so paused-time tests see deterministic durations.
//!
//! With a monitor attached, each call is also published as an
//! [`ExecutionEvent`] attributed to the inner query's name.

use std::sync::Arc;

use async_trait::async_trait;
use dashgate_domain::{
    duration_millis, CustomerId, DashboardRecord, DashboardResult, ExecutionEvent,
    MetricsSnapshot,
};
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::monitor::PerformanceMonitor;
use crate::query::DashboardQuery;

#[derive(Debug, Default)]
struct MetricsState {
    success_count: u64,
    failure_count: u64,
    latencies: Vec<u64>,
}

pub struct MetricsDecorator {
    inner: Arc<dyn DashboardQuery>,
    state: Mutex<MetricsState>,
    monitor: Option<Arc<PerformanceMonitor>>,
}

impl MetricsDecorator {
    pub fn new(inner: Arc<dyn DashboardQuery>) -> Self {
        Self { inner, state: Mutex::new(MetricsState::default()), monitor: None }
    }

    /// Also publish one execution event per call to `monitor`.
    pub fn with_monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        let state = self.state.lock();
        MetricsSnapshot::from_latencies(
            state.latencies.clone(),
            state.success_count,
            state.failure_count,
        )
    }

    pub fn reset(&self) {
        *self.state.lock() = MetricsState::default();
    }

    fn record(&self, duration_ms: u64, success: bool) {
        let mut state = self.state.lock();
        state.latencies.push(duration_ms);
        if success {
            state.success_count += 1;
        } else {
            state.failure_count += 1;
        }
    }
}

#[async_trait]
impl DashboardQuery for MetricsDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        let started = Instant::now();
        let result = self.inner.fetch(customer_id).await;
        let elapsed = started.elapsed();

        self.record(duration_millis(elapsed), result.is_ok());

        if let Some(monitor) = &self.monitor {
            let event = match &result {
                Ok(_) => ExecutionEvent::success(self.name(), customer_id, elapsed),
                Err(err) => {
                    ExecutionEvent::failure(self.name(), customer_id, elapsed, err.to_string())
                }
            };
            monitor.record_event(event);
        }

        result
    }
}
