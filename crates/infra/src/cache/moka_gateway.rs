//! In-process cache gateway using Moka
//!
//! Each entry carries its own TTL (the cache-aside strategy chooses it per
//! write), enforced through a moka [`Expiry`] policy. Capacity is bounded by
//! `CacheConfig::max_capacity`; moka evicts by TinyLFU once it is reached.
//!
//! This cache is per process. Two processes over the same database do not
//! see each other's entries or invalidations.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashgate_core::ports::CacheGateway;
use dashgate_domain::{duration_millis, CacheConfig, DashboardResult};
use moka::future::Cache;
use moka::Expiry;
use tracing::debug;

#[derive(Clone)]
struct CacheEntry {
    bytes: Vec<u8>,
    ttl: Duration,
}

/// Longest TTL handed to moka; larger values are clamped so expiry
/// instants stay representable.
const MAX_ENTRY_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Expires every entry `ttl` after it was last written.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl.min(MAX_ENTRY_TTL))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl.min(MAX_ENTRY_TTL))
    }
}

#[derive(Clone)]
pub struct MokaCacheGateway {
    cache: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for MokaCacheGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheGateway")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MokaCacheGateway {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_capacity)
    }

    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).expire_after(EntryTtl).build();

        debug!(max_capacity, "Moka cache gateway created");
        Self { cache }
    }

    /// Approximate number of live entries; exact after [`Self::run_pending_tasks`].
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending evictions and expirations now.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl CacheGateway for MokaCacheGateway {
    async fn get(&self, key: &str) -> DashboardResult<Option<Vec<u8>>> {
        let result = self.cache.get(key).await.map(|entry| entry.bytes);

        if result.is_some() {
            debug!(key, "Cache HIT (moka)");
        } else {
            debug!(key, "Cache MISS (moka)");
        }
        Ok(result)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> DashboardResult<()> {
        self.cache.insert(key.to_string(), CacheEntry { bytes: value, ttl }).await;
        debug!(key, ttl_ms = duration_millis(ttl), "Cache SET (moka)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> DashboardResult<bool> {
        let removed = self.cache.remove(key).await.is_some();
        debug!(key, removed, "Cache DEL (moka)");
        Ok(removed)
    }

    async fn flush_all(&self) -> DashboardResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!("Cache FLUSH (moka)");
        Ok(())
    }
}
