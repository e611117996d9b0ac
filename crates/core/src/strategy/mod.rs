//! Interchangeable data-access strategies
//!
//! All three issue the same [`DashboardLookup`](dashgate_domain::DashboardLookup)
//! against the record store; they differ only in how they use the cache.

pub mod cache_aside;
pub mod direct;
pub mod hybrid;

use std::sync::Arc;

pub use cache_aside::{CacheAsideStrategy, CacheStats, FetchOutcome, FetchSource};
use dashgate_domain::{CacheConfig, StrategyConfig, StrategyKind};
pub use direct::DirectStoreStrategy;
pub use hybrid::HybridStrategy;

use crate::ports::{CacheGateway, RecordStore};
use crate::query::DashboardQuery;

/// Build the configured strategy over the given gateways.
pub fn from_config(
    strategy: &StrategyConfig,
    cache_config: &CacheConfig,
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheGateway>,
) -> Arc<dyn DashboardQuery> {
    match strategy.kind {
        StrategyKind::CacheAside => {
            Arc::new(CacheAsideStrategy::new(store, cache).with_ttl(cache_config.ttl()))
        }
        StrategyKind::DirectStore => Arc::new(DirectStoreStrategy::new(store)),
        StrategyKind::Hybrid => Arc::new(
            HybridStrategy::new(store, cache)
                .with_hot_threshold(strategy.hot_threshold)
                .with_ttl(cache_config.ttl()),
        ),
    }
}
