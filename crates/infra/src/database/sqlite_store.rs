//! SQLite-backed implementation of `RecordStore`
//!
//! Connections come from the shared [`DbManager`] pool; every query runs on
//! the blocking pool so the async runtime never waits on disk I/O.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use dashgate_core::ports::RecordStore;
use dashgate_domain::{
    CustomerId, CustomerSummary, DashboardLookup, DashboardRecord, DashboardResult, OrderStatus,
    OrderSummary,
};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::{InfraError, InfraResult};

/// SQLite-backed record store
pub struct SqliteRecordStore {
    db: Arc<DbManager>,
}

impl SqliteRecordStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a customer row.
    pub async fn upsert_customer(&self, customer: CustomerSummary) -> DashboardResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> InfraResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO customers (id, name, email) VALUES (?1, ?2, ?3)",
                params![customer.id, customer.name, customer.email],
            )?;
            Ok(())
        })
        .await
        .map_err(InfraError::from)??;
        Ok(())
    }

    /// Insert or replace an order belonging to `customer_id`.
    pub async fn upsert_order(
        &self,
        customer_id: CustomerId,
        order: OrderSummary,
    ) -> DashboardResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> InfraResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO orders (id, customer_id, total_amount, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    order.id,
                    customer_id,
                    order.total_amount,
                    order.status.to_string(),
                    order.created_at.timestamp()
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(InfraError::from)??;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self), fields(customer_id = lookup.customer_id))]
    async fn load_dashboard(&self, lookup: &DashboardLookup) -> DashboardResult<DashboardRecord> {
        let db = Arc::clone(&self.db);
        let lookup = *lookup;

        let record = task::spawn_blocking(move || -> InfraResult<DashboardRecord> {
            let conn = db.get_connection()?;
            query_dashboard(&conn, &lookup)
        })
        .await
        .map_err(InfraError::from)??;

        debug!(found = record.is_found(), orders = record.orders().len(), "Dashboard loaded");
        Ok(record)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn query_dashboard(conn: &Connection, lookup: &DashboardLookup) -> InfraResult<DashboardRecord> {
    let customer = conn
        .query_row(
            "SELECT id, name, email FROM customers WHERE id = ?1",
            params![lookup.customer_id],
            map_customer_row,
        )
        .optional()?;

    let Some(customer) = customer else {
        return Ok(DashboardRecord::not_found());
    };

    if lookup.statuses.is_empty() || lookup.limit == 0 {
        return Ok(DashboardRecord::new(Some(customer), Vec::new()));
    }

    let placeholders = (0..lookup.statuses.len())
        .map(|i| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    let limit_param = lookup.statuses.len() + 2;
    let sql = format!(
        "SELECT id, total_amount, status, created_at FROM orders
         WHERE customer_id = ?1 AND status IN ({placeholders})
         ORDER BY created_at DESC, id DESC
         LIMIT ?{limit_param}"
    );

    let mut values = Vec::with_capacity(lookup.statuses.len() + 2);
    values.push(Value::Integer(lookup.customer_id));
    values.extend(lookup.statuses.iter().map(|status| Value::Text(status.to_string())));
    values.push(Value::Integer(i64::try_from(lookup.limit).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&sql)?;
    let orders = stmt
        .query_map(params_from_iter(values), map_order_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DashboardRecord::new(Some(customer), orders))
}

fn map_customer_row(row: &Row<'_>) -> rusqlite::Result<CustomerSummary> {
    Ok(CustomerSummary { id: row.get(0)?, name: row.get(1)?, email: row.get(2)? })
}

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<OrderSummary> {
    let status_text: String = row.get(2)?;
    let status = status_text
        .parse::<OrderStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;

    let created_secs: i64 = row.get(3)?;
    let created_at = DateTime::from_timestamp(created_secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Integer,
            format!("timestamp out of range: {created_secs}").into(),
        )
    })?;

    Ok(OrderSummary { id: row.get(0)?, total_amount: row.get(1)?, status, created_at })
}
