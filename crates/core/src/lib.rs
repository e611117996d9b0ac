//! # Dashgate Core
//!
//! Query pipeline business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The [`DashboardQuery`] capability and the gateway ports it reads through
//! - Query strategies (cache-aside, direct-store, hybrid)
//! - Resilience decorators and the chain builder that stacks them
//! - The performance monitor and its in-process observers
//!
//! ## Architecture Principles
//! - Depends only on `dashgate-common` and `dashgate-domain`
//! - No database, cache client or file code
//! - All external dependencies via traits in [`ports`]

pub mod decorators;
pub mod monitor;
pub mod ports;
pub mod query;
pub mod strategy;

pub use decorators::{
    CallOutcome, CircuitBreakerDecorator, LogEntry, LogSink, LoggingDecorator, MetricsDecorator,
    QueryChain, QueryChainBuilder, RetryDecorator, TimeoutDecorator, TracingLogSink,
};
pub use monitor::{
    AggregatorObserver, ConsoleObserver, MonitorNotification, ObserverError, PerformanceMonitor,
    PerformanceObserver, SubscriptionId,
};
pub use ports::{CacheGateway, RecordStore};
pub use query::{validate_customer_id, DashboardQuery};
pub use strategy::{
    CacheAsideStrategy, CacheStats, DirectStoreStrategy, FetchOutcome, FetchSource,
    HybridStrategy,
};
