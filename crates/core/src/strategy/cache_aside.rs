//! Cache-aside strategy
//!
//! Read the cache first; on a miss read the store and populate the cache.
//!
//! ## Degraded cache
//! The cache is an optimisation, never a dependency:
//! - a failed or undecodable `get` is treated as a miss
//! - a failed write is logged and counted, and the record is still returned
//!
//! Only store failures fail the fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashgate_domain::constants::DEFAULT_CACHE_TTL_SECS;
use dashgate_domain::{CustomerId, DashboardLookup, DashboardRecord, DashboardResult};
use tracing::{debug, warn};

use crate::ports::{CacheGateway, RecordStore};
use crate::query::{validate_customer_id, DashboardQuery};

pub const CACHE_ASIDE_NAME: &str = "cache_aside";

/// Where a fetched record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Store,
}

/// A fetched record plus the metadata a plain `fetch` drops.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub record: DashboardRecord,
    pub source: FetchSource,
    /// Set when the record was served but could not be written back
    pub cache_error: Option<String>,
}

/// Hit/miss tallies for one cache-aside strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub write_failures: u64,
}

impl CacheStats {
    /// Hit rate as a fraction (0.0 to 1.0); 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    write_failures: AtomicU64,
}

pub struct CacheAsideStrategy {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheGateway>,
    ttl: Duration,
    counters: CacheCounters,
}

impl CacheAsideStrategy {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn CacheGateway>) -> Self {
        Self {
            store,
            cache,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            counters: CacheCounters::default(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch and report whether the cache served it and whether the
    /// write-back failed.
    pub async fn fetch_detailed(&self, customer_id: CustomerId) -> DashboardResult<FetchOutcome> {
        validate_customer_id(customer_id)?;
        let lookup = DashboardLookup::for_customer(customer_id);
        let key = lookup.cache_key();

        if let Some(record) = self.read_cache(&key).await {
            self.counters.hits.fetch_add(1, Ordering::SeqCst);
            debug!(customer_id, "Dashboard cache hit");
            return Ok(FetchOutcome { record, source: FetchSource::Cache, cache_error: None });
        }

        self.counters.misses.fetch_add(1, Ordering::SeqCst);
        debug!(customer_id, "Dashboard cache miss, reading store");

        let record = self.store.load_dashboard(&lookup).await?;
        let cache_error = self.write_cache(&key, &record).await;

        Ok(FetchOutcome { record, source: FetchSource::Store, cache_error })
    }

    /// Drop one customer's cached dashboard; returns whether it was cached.
    pub async fn invalidate(&self, customer_id: CustomerId) -> DashboardResult<bool> {
        validate_customer_id(customer_id)?;
        self.cache.delete(&DashboardLookup::for_customer(customer_id).cache_key()).await
    }

    pub async fn clear_cache(&self) -> DashboardResult<()> {
        self.cache.flush_all().await
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::SeqCst),
            misses: self.counters.misses.load(Ordering::SeqCst),
            write_failures: self.counters.write_failures.load(Ordering::SeqCst),
        }
    }

    async fn read_cache(&self, key: &str) -> Option<DashboardRecord> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(key, error = %err, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Best-effort write-back; returns the failure message instead of
    /// failing the fetch.
    async fn write_cache(&self, key: &str, record: &DashboardRecord) -> Option<String> {
        let result = match serde_json::to_vec(record) {
            Ok(bytes) => self.cache.set_with_ttl(key, bytes, self.ttl).await,
            Err(err) => Err(err.into()),
        };

        result.err().map(|err| {
            self.counters.write_failures.fetch_add(1, Ordering::SeqCst);
            warn!(key, error = %err, "Cache write failed, serving record from store");
            err.to_string()
        })
    }
}

#[async_trait]
impl DashboardQuery for CacheAsideStrategy {
    fn name(&self) -> &str {
        CACHE_ASIDE_NAME
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        self.fetch_detailed(customer_id).await.map(|outcome| outcome.record)
    }
}
