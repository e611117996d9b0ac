//! The single capability every strategy and decorator implements

use async_trait::async_trait;
use dashgate_domain::{CustomerId, DashboardError, DashboardRecord, DashboardResult};

/// Fetch one customer's dashboard.
///
/// Strategies implement it against the gateways; decorators implement it by
/// delegating to an inner `Arc<dyn DashboardQuery>`.
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Name used to attribute execution events. Decorators report the name
    /// of what they wrap.
    fn name(&self) -> &str;

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord>;
}

/// Reject non-positive identifiers before any gateway is touched.
pub fn validate_customer_id(customer_id: CustomerId) -> DashboardResult<()> {
    if customer_id <= 0 {
        return Err(DashboardError::validation(
            "customer_id",
            format!("must be a positive integer, got {customer_id}"),
        ));
    }
    Ok(())
}
