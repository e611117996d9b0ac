//! Customer dashboard read-model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CACHE_KEY_PREFIX, DASHBOARD_ORDER_STATUSES, ORDER_LIMIT};
use crate::impl_domain_status_conversions;

/// Customer identifier as stored in the record store.
pub type CustomerId = i64;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl_domain_status_conversions!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Dashboard for one customer: the customer row plus their most recent open
/// orders.
///
/// Always built through [`DashboardRecord::new`] (deserialization included),
/// which holds two invariants: at most [`ORDER_LIMIT`] orders, and no orders
/// without a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordParts")]
pub struct DashboardRecord {
    customer: Option<CustomerSummary>,
    orders: Vec<OrderSummary>,
}

#[derive(Deserialize)]
struct RecordParts {
    customer: Option<CustomerSummary>,
    #[serde(default)]
    orders: Vec<OrderSummary>,
}

impl From<RecordParts> for DashboardRecord {
    fn from(parts: RecordParts) -> Self {
        Self::new(parts.customer, parts.orders)
    }
}

impl DashboardRecord {
    pub fn new(customer: Option<CustomerSummary>, mut orders: Vec<OrderSummary>) -> Self {
        if customer.is_none() {
            orders.clear();
        }
        orders.truncate(ORDER_LIMIT);
        Self { customer, orders }
    }

    /// The record returned for an unknown customer.
    pub fn not_found() -> Self {
        Self { customer: None, orders: Vec::new() }
    }

    pub fn customer(&self) -> Option<&CustomerSummary> {
        self.customer.as_ref()
    }

    pub fn orders(&self) -> &[OrderSummary] {
        &self.orders
    }

    pub fn is_found(&self) -> bool {
        self.customer.is_some()
    }
}

/// The one read every strategy issues against the record store: a single
/// customer, orders restricted to open statuses, newest first, capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLookup {
    pub customer_id: CustomerId,
    pub statuses: &'static [OrderStatus],
    pub limit: usize,
}

impl DashboardLookup {
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self { customer_id, statuses: DASHBOARD_ORDER_STATUSES, limit: ORDER_LIMIT }
    }

    /// Cache key under which this customer's dashboard is stored.
    pub fn cache_key(&self) -> String {
        format!("{CACHE_KEY_PREFIX}{}", self.customer_id)
    }

    pub fn includes_status(&self, status: OrderStatus) -> bool {
        self.statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn customer(id: CustomerId) -> CustomerSummary {
        CustomerSummary { id, name: format!("Customer {id}"), email: format!("c{id}@example.com") }
    }

    fn order(id: i64) -> OrderSummary {
        OrderSummary {
            id,
            total_amount: 10.0 * id as f64,
            status: OrderStatus::Pending,
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).single().expect("valid ts"),
        }
    }

    #[test]
    fn test_new_truncates_orders_to_limit() {
        let orders = (0..25).map(order).collect();
        let record = DashboardRecord::new(Some(customer(1)), orders);
        assert_eq!(record.orders().len(), ORDER_LIMIT);
        assert_eq!(record.orders()[0].id, 0);
    }

    #[test]
    fn test_missing_customer_drops_orders() {
        let record = DashboardRecord::new(None, vec![order(1)]);
        assert_eq!(record, DashboardRecord::not_found());
        assert!(!record.is_found());
    }

    #[test]
    fn test_deserialization_enforces_invariants() {
        let json = serde_json::json!({
            "customer": null,
            "orders": [{
                "id": 1,
                "total_amount": 5.0,
                "status": "pending",
                "created_at": "2024-01-01T00:00:00Z"
            }]
        });

        let record: DashboardRecord = serde_json::from_value(json).expect("valid json");
        assert!(record.orders().is_empty());
    }

    #[test]
    fn test_json_shape_round_trips() {
        let record = DashboardRecord::new(Some(customer(7)), vec![order(3)]);
        let bytes = serde_json::to_vec(&record).expect("serialize");
        let decoded: DashboardRecord = serde_json::from_slice(&bytes).expect("deserialize");
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_lookup_shape_is_fixed() {
        let lookup = DashboardLookup::for_customer(123);
        assert_eq!(lookup.cache_key(), "dashboard:123");
        assert_eq!(lookup.limit, 10);
        assert!(lookup.includes_status(OrderStatus::Pending));
        assert!(lookup.includes_status(OrderStatus::Processing));
        assert!(!lookup.includes_status(OrderStatus::Shipped));
    }

    #[test]
    fn test_order_status_labels() {
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
        assert_eq!("PROCESSING".parse::<OrderStatus>(), Ok(OrderStatus::Processing));
        assert_eq!(serde_json::to_string(&OrderStatus::Shipped).expect("serialize"), "\"shipped\"");
    }
}
