//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `DASHGATE_STORE_PATH` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is checked with [`Config::validate`].
//!
//! ## Environment Variables
//! `DASHGATE_STORE_PATH` is required for environment loading; every other
//! variable is optional and falls back to the section default.
//! - `DASHGATE_STORE_PATH`: SQLite database file path
//! - `DASHGATE_STORE_POOL_SIZE`: Connection pool size
//! - `DASHGATE_CACHE_TTL_SECONDS`: Cache entry TTL
//! - `DASHGATE_CACHE_MAX_CAPACITY`: Maximum cached dashboards
//! - `DASHGATE_STRATEGY`: `cache_aside`, `direct_store` or `hybrid`
//! - `DASHGATE_HOT_THRESHOLD`: Hybrid hot-customer threshold
//! - `DASHGATE_MAX_RETRIES`: Retries after the first attempt
//! - `DASHGATE_RETRY_INITIAL_DELAY_MS`: First backoff delay
//! - `DASHGATE_TIMEOUT_MS`: Per-call timeout
//! - `DASHGATE_FAILURE_THRESHOLD`: Consecutive failures that open the breaker
//! - `DASHGATE_RESET_TIMEOUT_MS`: Breaker cool-down
//! - `DASHGATE_SLOW_QUERY_MS`: Slow-query alert threshold
//! - `DASHGATE_MONITOR_HISTORY`: Retained events and alerts
//! - `DASHGATE_MONITOR_LOG_PATH`: JSON-lines observer file
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` and `./dashgate.{json,toml}` (current directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use dashgate_domain::{Config, DashboardError, DashboardResult, StrategyKind};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DashboardError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> DashboardResult<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `DashboardError::Config` if `DASHGATE_STORE_PATH` is missing or
/// any set variable has an invalid value.
pub fn load_from_env() -> DashboardResult<Config> {
    let mut config = Config::default();
    config.store.path = PathBuf::from(env_var("DASHGATE_STORE_PATH")?);

    if let Some(size) = env_parse("DASHGATE_STORE_POOL_SIZE", "pool size")? {
        config.store.pool_size = size;
    }
    if let Some(ttl) = env_parse("DASHGATE_CACHE_TTL_SECONDS", "cache TTL")? {
        config.cache.ttl_seconds = ttl;
    }
    if let Some(capacity) = env_parse("DASHGATE_CACHE_MAX_CAPACITY", "cache capacity")? {
        config.cache.max_capacity = capacity;
    }
    if let Ok(kind) = std::env::var("DASHGATE_STRATEGY") {
        config.strategy.kind = StrategyKind::from_str(kind.trim()).map_err(DashboardError::config)?;
    }
    if let Some(threshold) = env_parse("DASHGATE_HOT_THRESHOLD", "hot threshold")? {
        config.strategy.hot_threshold = threshold;
    }
    if let Some(retries) = env_parse("DASHGATE_MAX_RETRIES", "max retries")? {
        config.resilience.retry.max_retries = retries;
    }
    if let Some(delay) = env_parse("DASHGATE_RETRY_INITIAL_DELAY_MS", "retry delay")? {
        config.resilience.retry.initial_delay_ms = delay;
    }
    if let Some(timeout) = env_parse("DASHGATE_TIMEOUT_MS", "timeout")? {
        config.resilience.timeout_ms = timeout;
    }
    if let Some(threshold) = env_parse("DASHGATE_FAILURE_THRESHOLD", "failure threshold")? {
        config.resilience.circuit_breaker.failure_threshold = threshold;
    }
    if let Some(reset) = env_parse("DASHGATE_RESET_TIMEOUT_MS", "reset timeout")? {
        config.resilience.circuit_breaker.reset_timeout_ms = reset;
    }
    if let Some(threshold) = env_parse("DASHGATE_SLOW_QUERY_MS", "slow query threshold")? {
        config.monitor.slow_query_threshold_ms = threshold;
    }
    if let Some(history) = env_parse("DASHGATE_MONITOR_HISTORY", "monitor history")? {
        config.monitor.max_history = history;
    }
    if let Ok(path) = std::env::var("DASHGATE_MONITOR_LOG_PATH") {
        config.monitor.log_path = Some(PathBuf::from(path));
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `DashboardError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or a value fails validation
pub fn load_from_file(path: Option<PathBuf>) -> DashboardResult<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DashboardError::config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DashboardError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DashboardError::config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> DashboardResult<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DashboardError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DashboardError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(DashboardError::config(format!("Unsupported config format: {extension}"))),
    }
}

const CONFIG_FILE_NAMES: &[&str] = &[
    "config.json",
    "config.toml",
    "dashgate.json",
    "dashgate.toml",
    "../config.json",
    "../config.toml",
    "../../config.json",
    "../../config.toml",
];

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> DashboardResult<String> {
    std::env::var(key).map_err(|_| {
        DashboardError::config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable
///
/// Returns `Ok(None)` when unset and an error when set but unparsable.
fn env_parse<T>(key: &str, label: &str) -> DashboardResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| DashboardError::config(format!("Invalid {label}: {e}"))),
        Err(_) => Ok(None),
    }
}
