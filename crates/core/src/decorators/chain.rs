//! Decorator chain builder
//!
//! Each `with_*` call wraps everything built so far, so the last layer added
//! is the outermost:
//!
//! ```text
//! QueryChain::builder(base).with_timeout(t).with_retry(3, d).with_metrics()
//!     == Metrics(Retry(Timeout(base)))
//! ```
//!
//! The builder keeps typed handles to the outermost metrics layer and the
//! outermost breaker so the finished chain can report on them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashgate_common::resilience::{CircuitBreakerConfig, CircuitBreakerState};
use dashgate_domain::{
    CustomerId, DashboardError, DashboardRecord, DashboardResult, MetricsSnapshot,
    ResilienceConfig,
};

use super::circuit_breaker::CircuitBreakerDecorator;
use super::logging::{LogSink, LoggingDecorator};
use super::metrics::MetricsDecorator;
use super::retry::RetryDecorator;
use super::timeout::TimeoutDecorator;
use crate::monitor::PerformanceMonitor;
use crate::query::DashboardQuery;

pub struct QueryChainBuilder {
    current: Arc<dyn DashboardQuery>,
    metrics: Option<Arc<MetricsDecorator>>,
    breaker: Option<Arc<CircuitBreakerDecorator>>,
}

impl QueryChainBuilder {
    fn new(base: Arc<dyn DashboardQuery>) -> Self {
        Self { current: base, metrics: None, breaker: None }
    }

    pub fn with_retry(mut self, max_retries: u32, initial_delay: Duration) -> Self {
        self.current = Arc::new(RetryDecorator::new(self.current, max_retries, initial_delay));
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.current = Arc::new(TimeoutDecorator::new(self.current, duration));
        self
    }

    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> DashboardResult<Self> {
        let breaker = Arc::new(CircuitBreakerDecorator::new(self.current, config)?);
        self.breaker = Some(Arc::clone(&breaker));
        self.current = breaker;
        Ok(self)
    }

    pub fn with_metrics(self) -> Self {
        let decorator = MetricsDecorator::new(Arc::clone(&self.current));
        self.push_metrics(decorator)
    }

    /// Metrics layer that also publishes every call to `monitor`
    pub fn with_monitored_metrics(self, monitor: Arc<PerformanceMonitor>) -> Self {
        let decorator = MetricsDecorator::new(Arc::clone(&self.current)).with_monitor(monitor);
        self.push_metrics(decorator)
    }

    pub fn with_logging(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.current = Arc::new(LoggingDecorator::new(self.current, sink));
        self
    }

    pub fn build(self) -> QueryChain {
        QueryChain { root: self.current, metrics: self.metrics, breaker: self.breaker }
    }

    fn push_metrics(mut self, decorator: MetricsDecorator) -> Self {
        let metrics = Arc::new(decorator);
        self.metrics = Some(Arc::clone(&metrics));
        self.current = metrics;
        self
    }
}

/// A fully assembled decorator stack
pub struct QueryChain {
    root: Arc<dyn DashboardQuery>,
    metrics: Option<Arc<MetricsDecorator>>,
    breaker: Option<Arc<CircuitBreakerDecorator>>,
}

impl QueryChain {
    pub fn builder(base: Arc<dyn DashboardQuery>) -> QueryChainBuilder {
        QueryChainBuilder::new(base)
    }

    /// Default stack: `Metrics(Retry(CircuitBreaker(Timeout(base))))`.
    ///
    /// The metrics layer publishes to `monitor` when one is given.
    pub fn from_config(
        base: Arc<dyn DashboardQuery>,
        config: &ResilienceConfig,
        monitor: Option<Arc<PerformanceMonitor>>,
    ) -> DashboardResult<Self> {
        let breaker_config = CircuitBreakerConfig::builder()
            .failure_threshold(config.circuit_breaker.failure_threshold)
            .reset_timeout(config.circuit_breaker.reset_timeout())
            .build()
            .map_err(|err| DashboardError::config(err.to_string()))?;

        let builder = Self::builder(base)
            .with_timeout(config.timeout())
            .with_circuit_breaker(breaker_config)?
            .with_retry(config.retry.max_retries, config.retry.initial_delay());

        let builder = match monitor {
            Some(monitor) => builder.with_monitored_metrics(monitor),
            None => builder.with_metrics(),
        };
        Ok(builder.build())
    }

    /// Snapshot of the outermost metrics layer, if the chain has one
    pub fn get_metrics(&self) -> Option<MetricsSnapshot> {
        self.metrics.as_ref().map(|metrics| metrics.metrics())
    }

    pub fn reset_metrics(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.reset();
        }
    }

    /// State of the outermost circuit breaker, if the chain has one
    pub fn breaker_state(&self) -> Option<CircuitBreakerState> {
        self.breaker.as_ref().map(|breaker| breaker.state())
    }
}

#[async_trait]
impl DashboardQuery for QueryChain {
    fn name(&self) -> &str {
        self.root.name()
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        self.root.fetch(customer_id).await
    }
}
