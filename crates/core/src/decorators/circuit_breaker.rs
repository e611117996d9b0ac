//! Circuit breaker decorator
//!
//! Each decorator owns one [`CircuitBreaker`]; breakers are never shared
//! between chains. Validation errors are caller faults and release the
//! breaker permit without counting for or against the dependency.

use std::sync::Arc;

use async_trait::async_trait;
use dashgate_common::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitBreakerState, Clock,
    ResilienceError, SystemClock,
};
use dashgate_domain::{CustomerId, DashboardError, DashboardRecord, DashboardResult};

use crate::query::DashboardQuery;

pub struct CircuitBreakerDecorator<C: Clock = SystemClock> {
    inner: Arc<dyn DashboardQuery>,
    breaker: CircuitBreaker<C>,
}

impl CircuitBreakerDecorator<SystemClock> {
    pub fn new(
        inner: Arc<dyn DashboardQuery>,
        config: CircuitBreakerConfig,
    ) -> DashboardResult<Self> {
        Self::with_clock(inner, config, SystemClock)
    }
}

impl<C: Clock> CircuitBreakerDecorator<C> {
    pub fn with_clock(
        inner: Arc<dyn DashboardQuery>,
        config: CircuitBreakerConfig,
        clock: C,
    ) -> DashboardResult<Self> {
        let breaker = CircuitBreaker::with_clock(config, clock)
            .map_err(|err| DashboardError::config(err.to_string()))?;
        Ok(Self { inner, breaker })
    }

    pub fn state(&self) -> CircuitBreakerState {
        self.breaker.state()
    }

    pub fn metrics(&self) -> CircuitBreakerMetrics {
        self.breaker.metrics()
    }

    pub fn reset(&self) {
        self.breaker.reset();
    }
}

#[async_trait]
impl<C: Clock> DashboardQuery for CircuitBreakerDecorator<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        let result = self
            .breaker
            .execute_classified(
                || self.inner.fetch(customer_id),
                |err: &DashboardError| !err.is_validation(),
            )
            .await;

        result.map_err(|err| match err {
            ResilienceError::CircuitOpen { retry_after } => {
                DashboardError::CircuitOpen { retry_after }
            }
            ResilienceError::OperationFailed { source } => source,
        })
    }
}
