//! Modular common utilities shared across Dashgate crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification and severity levels
//! - `runtime`: async resilience infrastructure (clock, circuit breaker,
//!   retry)
//! - `observability`: tracing instrumentation (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{
    BackoffStrategy, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder,
    CircuitBreakerMetrics, CircuitBreakerState, CircuitState, Clock, MockClock,
    ResilienceError, ResilienceResult, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryPolicy, RetryResult, SystemClock,
};
