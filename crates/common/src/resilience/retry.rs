//! Generic retry executor with pluggable policies and backoff strategies
//!
//! The executor runs an operation until it succeeds, the policy refuses to
//! retry, or the attempt budget is spent. The policy is consulted before the
//! budget, so a non-retryable error is always reported as such even on the
//! final attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries")]
    AttemptsExhausted { attempts: u32, last_error: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error on attempt {attempt}: {source}")]
    NonRetryable { source: E, attempt: u32 },

    /// The retry strategy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a custom
    /// delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Doubling backoff starting at `initial_delay`, effectively uncapped.
    pub fn doubling(initial_delay: Duration) -> Self {
        BackoffStrategy::Exponential { initial_delay, base: 2.0, max_delay: Duration::MAX }
    }

    /// Calculate the delay after the given zero-based failed attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = initial_delay.as_secs_f64() * base.powi(exponent);
                Duration::try_from_secs_f64(secs).unwrap_or(*max_delay).min(*max_delay)
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            let attempt_number = attempt + 1;
            debug!("Executing operation (attempt {}/{})", attempt_number, self.config.max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt_number, total_delay };
                }
                Err(error) => error,
            };

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!("Retry policy determined not to retry: {:?}", error);
                    return RetryOutcome {
                        result: Err(RetryError::NonRetryable {
                            source: error,
                            attempt: attempt_number,
                        }),
                        attempts: attempt_number,
                        total_delay,
                    };
                }
                RetryDecision::Retry => self.config.backoff.calculate_delay(attempt),
                RetryDecision::RetryAfter(custom_delay) => custom_delay,
            };

            if attempt_number >= self.config.max_attempts {
                warn!(
                    "All retry attempts exhausted after {} tries, last error: {:?}",
                    attempt_number, error
                );
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted {
                        attempts: attempt_number,
                        last_error: error,
                    }),
                    attempts: attempt_number,
                    total_delay,
                };
            }

            warn!("Operation failed (attempt {}), retrying after {:?}", attempt_number, delay);
            tokio::time::sleep(delay).await;
            total_delay += delay;
            attempt += 1;
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::*;
    use crate::error::ErrorClassification;

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone, Copy)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }

    /// Retries exactly the errors that classify themselves as retryable.
    #[derive(Debug, Clone, Copy)]
    pub struct Classified;

    impl<E: ErrorClassification> RetryPolicy<E> for Classified {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if error.is_retryable() {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
