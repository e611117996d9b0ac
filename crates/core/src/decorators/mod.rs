//! Resilience decorators
//!
//! Every decorator implements [`DashboardQuery`](crate::query::DashboardQuery),
//! owns exactly one inner query and reports the inner query's name. An error
//! from below is either absorbed by the decorator's policy (retried, replaced
//! by a timeout, short-circuited) or passed up unchanged.

pub mod chain;
pub mod circuit_breaker;
pub mod logging;
pub mod metrics;
pub mod retry;
pub mod timeout;

pub use chain::{QueryChain, QueryChainBuilder};
pub use circuit_breaker::CircuitBreakerDecorator;
pub use logging::{CallOutcome, LogEntry, LogSink, LoggingDecorator, TracingLogSink};
pub use metrics::MetricsDecorator;
pub use retry::RetryDecorator;
pub use timeout::TimeoutDecorator;
