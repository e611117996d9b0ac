//! Retry decorator
//!
//! Runs the inner query through a [`RetryExecutor`] with doubling backoff
//! (`initial_delay * 2^attempt`, no jitter). Validation errors are returned
//! unchanged on whichever attempt they occur; any other error is retried
//! until `max_retries` extra attempts are spent, then wrapped in
//! `DashboardError::Query` together with the attempt count.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashgate_common::resilience::{
    policies, BackoffStrategy, RetryConfig, RetryError, RetryExecutor,
};
use dashgate_domain::{CustomerId, DashboardError, DashboardRecord, DashboardResult};

use crate::query::DashboardQuery;

pub struct RetryDecorator {
    inner: Arc<dyn DashboardQuery>,
    executor: RetryExecutor<policies::Classified>,
    max_retries: u32,
}

impl RetryDecorator {
    pub fn new(inner: Arc<dyn DashboardQuery>, max_retries: u32, initial_delay: Duration) -> Self {
        let config = RetryConfig {
            max_attempts: max_retries.saturating_add(1),
            backoff: BackoffStrategy::doubling(initial_delay),
        };
        Self { inner, executor: RetryExecutor::new(config, policies::Classified), max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

#[async_trait]
impl DashboardQuery for RetryDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        let result = self.executor.execute(|| self.inner.fetch(customer_id)).await;

        result.map_err(|err| match err {
            RetryError::NonRetryable { source, .. } => source,
            RetryError::AttemptsExhausted { attempts, last_error } => {
                DashboardError::Query { attempts, source: Box::new(last_error) }
            }
            RetryError::InvalidConfiguration { message } => DashboardError::Config { message },
        })
    }
}
