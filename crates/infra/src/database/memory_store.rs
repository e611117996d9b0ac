//! In-memory implementation of `RecordStore`
//!
//! Applies the same filter, ordering and limit as the SQLite store. Useful
//! for demos and tests that need a real store without a file.

use std::collections::HashMap;

use async_trait::async_trait;
use dashgate_core::ports::RecordStore;
use dashgate_domain::{
    CustomerId, CustomerSummary, DashboardLookup, DashboardRecord, DashboardResult, OrderSummary,
};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct CustomerRows {
    customer: Option<CustomerSummary>,
    orders: Vec<OrderSummary>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    rows: RwLock<HashMap<CustomerId, CustomerRows>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_customer(&self, customer: CustomerSummary) {
        let id = customer.id;
        let mut rows = self.rows.write();
        rows.entry(id).or_default().customer = Some(customer);
    }

    /// Orders may be inserted before their customer; they stay invisible until
    /// the customer exists.
    pub fn insert_order(&self, customer_id: CustomerId, order: OrderSummary) {
        let mut rows = self.rows.write();
        let entry = rows.entry(customer_id).or_default();
        entry.orders.retain(|existing| existing.id != order.id);
        entry.orders.push(order);
    }

    pub fn customer_count(&self) -> usize {
        self.rows.read().values().filter(|rows| rows.customer.is_some()).count()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load_dashboard(&self, lookup: &DashboardLookup) -> DashboardResult<DashboardRecord> {
        let rows = self.rows.read();
        let Some(CustomerRows { customer: Some(customer), orders }) = rows.get(&lookup.customer_id)
        else {
            return Ok(DashboardRecord::not_found());
        };

        let mut selected: Vec<OrderSummary> = orders
            .iter()
            .filter(|order| lookup.includes_status(order.status))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        selected.truncate(lookup.limit);

        Ok(DashboardRecord::new(Some(customer.clone()), selected))
    }
}
