//! Resilience patterns for fault tolerance and error handling
//!
//! This module provides generic, reusable resilience primitives:
//! - **Circuit Breaker**: an explicit state machine that stops calling a
//!   failing dependency and probes it again after a cool-down
//! - **Retry Logic**: a policy-driven executor with fixed or exponential
//!   backoff
//! - **Clock**: a time source abstraction so breakers can be driven by a
//!   [`MockClock`] in tests
//!
//! Everything here is generic over the caller's error type. Domain crates
//! decide what counts as a failure or a retryable error, usually through
//! [`crate::error::ErrorClassification`].

pub mod circuit_breaker;
pub mod clock;
pub mod retry;

// Re-export circuit breaker types
pub use circuit_breaker::{
    BreakerEvent, BreakerMachine, CallPermit, CircuitBreaker, CircuitBreakerConfig,
    CircuitBreakerConfigBuilder, CircuitBreakerMetrics, CircuitBreakerState, CircuitState,
    ConfigError, ConfigResult, Permit, ResilienceError, ResilienceResult, Transition,
};
pub use clock::{Clock, MockClock, SystemClock};
// Re-export retry types
pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
