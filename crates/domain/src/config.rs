//! Configuration structures
//!
//! Every section deserializes with defaults, so a config file only needs the
//! keys it overrides. Loading from environment and files lives in
//! `dashgate-infra::config`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{DashboardError, DashboardResult};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub strategy: StrategyConfig,
    pub resilience: ResilienceConfig,
    pub monitor: MonitorConfig,
}

impl Config {
    /// Reject values that would make a component misbehave rather than fail
    /// to construct.
    pub fn validate(&self) -> DashboardResult<()> {
        if self.cache.ttl_seconds == 0 {
            return Err(DashboardError::config("cache.ttl_seconds must be greater than 0"));
        }
        if self.cache.max_capacity == 0 {
            return Err(DashboardError::config("cache.max_capacity must be greater than 0"));
        }
        if self.store.pool_size == 0 {
            return Err(DashboardError::config("store.pool_size must be greater than 0"));
        }
        if self.strategy.hot_threshold == 0 {
            return Err(DashboardError::config("strategy.hot_threshold must be greater than 0"));
        }
        if self.resilience.timeout_ms == 0 {
            return Err(DashboardError::config("resilience.timeout_ms must be greater than 0"));
        }
        if self.resilience.circuit_breaker.failure_threshold == 0 {
            return Err(DashboardError::config(
                "resilience.circuit_breaker.failure_threshold must be greater than 0",
            ));
        }
        if self.resilience.circuit_breaker.reset_timeout_ms == 0 {
            return Err(DashboardError::config(
                "resilience.circuit_breaker.reset_timeout_ms must be greater than 0",
            ));
        }
        if self.monitor.max_history == 0 {
            return Err(DashboardError::config("monitor.max_history must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: DEFAULT_CACHE_TTL_SECS, max_capacity: DEFAULT_CACHE_CAPACITY }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub pool_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_STORE_PATH), pool_size: DEFAULT_STORE_POOL_SIZE }
    }
}

/// Which data-access strategy backs the query chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    CacheAside,
    DirectStore,
    Hybrid,
}

crate::impl_domain_status_conversions!(StrategyKind {
    CacheAside => "cache_aside",
    DirectStore => "direct_store",
    Hybrid => "hybrid",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub hot_threshold: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self { kind: StrategyKind::default(), hot_threshold: DEFAULT_HOT_THRESHOLD }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: DEFAULT_RETRY_INITIAL_DELAY_MS,
        }
    }
}

impl RetrySettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout_ms: DEFAULT_RESET_TIMEOUT_MS,
        }
    }
}

impl CircuitBreakerSettings {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub retry: RetrySettings,
    pub timeout_ms: u64,
    pub circuit_breaker: CircuitBreakerSettings,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetrySettings::default(),
            timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            circuit_breaker: CircuitBreakerSettings::default(),
        }
    }
}

impl ResilienceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub slow_query_threshold_ms: u64,
    pub max_history: usize,
    /// JSON-lines file observer target; disabled when absent
    pub log_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: DEFAULT_SLOW_QUERY_THRESHOLD_MS,
            max_history: DEFAULT_MONITOR_HISTORY,
            log_path: None,
        }
    }
}
