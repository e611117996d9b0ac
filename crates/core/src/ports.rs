//! Port interfaces for the backing store and the fast cache
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use std::time::Duration;

use async_trait::async_trait;
use dashgate_domain::{DashboardLookup, DashboardRecord, DashboardResult};

/// Durable store holding customers and their orders
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run the fixed dashboard lookup.
    ///
    /// Returns [`DashboardRecord::not_found`] for an unknown customer and
    /// `DashboardError::Store` on connectivity or query failure.
    async fn load_dashboard(&self, lookup: &DashboardLookup) -> DashboardResult<DashboardRecord>;
}

/// Volatile key/value cache
///
/// Faults surface as `DashboardError::Cache`.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    async fn get(&self, key: &str) -> DashboardResult<Option<Vec<u8>>>;

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration)
        -> DashboardResult<()>;

    /// Remove one key; returns whether it was present
    async fn delete(&self, key: &str) -> DashboardResult<bool>;

    async fn flush_all(&self) -> DashboardResult<()>;
}
