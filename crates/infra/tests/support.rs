#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use dashgate_domain::{CustomerId, OrderStatus};
use dashgate_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn insert_customer(&self, id: CustomerId) {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO customers (id, name, email) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, format!("Customer {id}"), format!("c{id}@example.com")],
        )
        .expect("customer insert should succeed");
    }

    pub fn insert_order(&self, id: i64, customer_id: CustomerId, status: OrderStatus, created: i64) {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO orders (id, customer_id, total_amount, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, customer_id, id as f64 * 2.5, status.to_string(), created],
        )
        .expect("order insert should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}
