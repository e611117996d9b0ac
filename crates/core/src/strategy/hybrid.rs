//! Hybrid strategy: cold customers read the store directly, hot customers go
//! through the cache.
//!
//! Each fetch increments the customer's access count first and then routes
//! on the new value, so with threshold `T` call `T` is the first cached call.
//! Counts are never decremented: once hot, a customer stays hot for the
//! lifetime of the strategy.

use std::sync::Arc;

use async_trait::async_trait;
use dashgate_domain::constants::DEFAULT_HOT_THRESHOLD;
use dashgate_domain::{CustomerId, DashboardRecord, DashboardResult};
use dashmap::DashMap;
use tracing::debug;

use super::cache_aside::{CacheAsideStrategy, CacheStats};
use super::direct::DirectStoreStrategy;
use crate::ports::{CacheGateway, RecordStore};
use crate::query::{validate_customer_id, DashboardQuery};

pub const HYBRID_NAME: &str = "hybrid";

pub struct HybridStrategy {
    cached: CacheAsideStrategy,
    direct: DirectStoreStrategy,
    access_counts: DashMap<CustomerId, u64>,
    hot_threshold: u64,
}

impl HybridStrategy {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn CacheGateway>) -> Self {
        Self {
            cached: CacheAsideStrategy::new(Arc::clone(&store), cache),
            direct: DirectStoreStrategy::new(store),
            access_counts: DashMap::new(),
            hot_threshold: DEFAULT_HOT_THRESHOLD,
        }
    }

    /// Threshold values below 1 are raised to 1.
    pub fn with_hot_threshold(mut self, threshold: u64) -> Self {
        self.hot_threshold = threshold.max(1);
        self
    }

    /// Forwarded to the embedded cache-aside path
    pub fn with_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.cached = self.cached.with_ttl(ttl);
        self
    }

    pub fn hot_threshold(&self) -> u64 {
        self.hot_threshold
    }

    pub fn access_count(&self, customer_id: CustomerId) -> u64 {
        self.access_counts.get(&customer_id).map(|count| *count).unwrap_or(0)
    }

    pub fn is_hot(&self, customer_id: CustomerId) -> bool {
        self.access_count(customer_id) >= self.hot_threshold
    }

    /// Hit/miss tallies of the cached path only
    pub fn cache_stats(&self) -> CacheStats {
        self.cached.cache_stats()
    }

    fn record_access(&self, customer_id: CustomerId) -> u64 {
        let mut count = self.access_counts.entry(customer_id).or_insert(0);
        *count += 1;
        *count
    }
}

#[async_trait]
impl DashboardQuery for HybridStrategy {
    fn name(&self) -> &str {
        HYBRID_NAME
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        validate_customer_id(customer_id)?;

        let count = self.record_access(customer_id);
        if count >= self.hot_threshold {
            debug!(customer_id, count, "Hot customer, using cache path");
            self.cached.fetch(customer_id).await
        } else {
            debug!(customer_id, count, "Cold customer, reading store directly");
            self.direct.fetch(customer_id).await
        }
    }
}
