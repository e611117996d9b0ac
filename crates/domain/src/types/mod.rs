//! Domain types and models
//!
//! - [`record`]: the customer dashboard read-model and its fixed lookup
//! - [`event`]: execution events and the alerts derived from them
//! - [`metrics`]: latency snapshots and monitor summaries

pub mod event;
pub mod metrics;
pub mod record;

pub use event::{duration_millis, Alert, AlertKind, ExecutionEvent};
pub use metrics::{nearest_rank, MetricsSnapshot, MonitorSummary, StrategyBreakdown};
pub use record::{
    CustomerId, CustomerSummary, DashboardLookup, DashboardRecord, OrderSummary, OrderStatus,
};
