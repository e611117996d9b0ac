//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::path::PathBuf;

use dashgate_domain::{DashboardError, StrategyKind};
use dashgate_infra::config;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[test]
fn test_load_config_from_json_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        "dashgate.json",
        r#"{
            "cache": { "ttl_seconds": 60, "max_capacity": 500 },
            "store": { "path": "/tmp/integration_test.db", "pool_size": 10 },
            "strategy": { "kind": "hybrid", "hot_threshold": 5 },
            "resilience": {
                "retry": { "max_retries": 2, "initial_delay_ms": 50 },
                "timeout_ms": 2000,
                "circuit_breaker": { "failure_threshold": 3, "reset_timeout_ms": 10000 }
            },
            "monitor": { "slow_query_threshold_ms": 250, "max_history": 100 }
        }"#,
    );

    let config = config::load_from_file(Some(path))?;

    assert_eq!(config.cache.ttl_seconds, 60);
    assert_eq!(config.cache.max_capacity, 500);
    assert_eq!(config.store.path, PathBuf::from("/tmp/integration_test.db"));
    assert_eq!(config.store.pool_size, 10);
    assert_eq!(config.strategy.kind, StrategyKind::Hybrid);
    assert_eq!(config.strategy.hot_threshold, 5);
    assert_eq!(config.resilience.retry.max_retries, 2);
    assert_eq!(config.resilience.timeout_ms, 2000);
    assert_eq!(config.resilience.circuit_breaker.failure_threshold, 3);
    assert_eq!(config.monitor.slow_query_threshold_ms, 250);
    assert_eq!(config.monitor.log_path, None);
    Ok(())
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "dashgate.toml",
        r#"
[store]
path = "/tmp/integration_test_toml.db"
pool_size = 8

[strategy]
kind = "direct_store"

[resilience]
timeout_ms = 1500

[resilience.retry]
max_retries = 0

[monitor]
log_path = "/tmp/dashgate-monitor.jsonl"
"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.store.pool_size, 8);
    assert_eq!(config.strategy.kind, StrategyKind::DirectStore);
    assert_eq!(config.resilience.timeout_ms, 1500);
    assert_eq!(config.resilience.retry.max_retries, 0);
    assert_eq!(config.monitor.log_path, Some(PathBuf::from("/tmp/dashgate-monitor.jsonl")));
}

#[test]
fn test_load_config_with_minimal_fields() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "config.json", r#"{ "store": { "path": "minimal.db" } }"#);

    let config = config::load_from_file(Some(path)).expect("Failed to load minimal config");

    assert_eq!(config.store.path, PathBuf::from("minimal.db"));
    assert_eq!(config.store.pool_size, 4);
    assert_eq!(config.cache.ttl_seconds, 300);
    assert_eq!(config.strategy.kind, StrategyKind::CacheAside);
    assert_eq!(config.strategy.hot_threshold, 3);
    assert_eq!(config.resilience.retry.max_retries, 3);
    assert_eq!(config.resilience.timeout_ms, 5000);
    assert_eq!(config.resilience.circuit_breaker.failure_threshold, 5);
    assert_eq!(config.monitor.max_history, 10_000);
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/config.json".into()));

    match result {
        Err(DashboardError::Config { message }) => {
            assert!(message.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "config.json", r#"{ "this is": "not valid" "#);

    match config::load_from_file(Some(path)) {
        Err(DashboardError::Config { message }) => {
            assert!(message.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_rejects_invalid_values() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "config.toml", "[cache]\nttl_seconds = 0\n");

    match config::load_from_file(Some(path)) {
        Err(DashboardError::Config { message }) => {
            assert!(message.contains("ttl_seconds"));
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}
