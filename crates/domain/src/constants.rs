//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

use crate::types::OrderStatus;

// Dashboard query shape
pub const ORDER_LIMIT: usize = 10;
pub const DASHBOARD_ORDER_STATUSES: &[OrderStatus] =
    &[OrderStatus::Pending, OrderStatus::Processing];
pub const CACHE_KEY_PREFIX: &str = "dashboard:";

// Cache configuration
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

// Strategy configuration
pub const DEFAULT_HOT_THRESHOLD: u64 = 3;

// Resilience configuration
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 100;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 30_000;

// Monitor configuration
pub const DEFAULT_SLOW_QUERY_THRESHOLD_MS: u64 = 1_000;
pub const DEFAULT_MONITOR_HISTORY: usize = 10_000;
pub const DEFAULT_AGGREGATOR_ALERT_CAPACITY: usize = 1_000;

// Store configuration
pub const DEFAULT_STORE_PATH: &str = "dashgate.db";
pub const DEFAULT_STORE_POOL_SIZE: u32 = 4;
