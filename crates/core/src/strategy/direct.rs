//! Direct-store strategy: every fetch reads the record store.

use std::sync::Arc;

use async_trait::async_trait;
use dashgate_domain::{CustomerId, DashboardLookup, DashboardRecord, DashboardResult};

use crate::ports::RecordStore;
use crate::query::{validate_customer_id, DashboardQuery};

pub const DIRECT_STORE_NAME: &str = "direct_store";

pub struct DirectStoreStrategy {
    store: Arc<dyn RecordStore>,
}

impl DirectStoreStrategy {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DashboardQuery for DirectStoreStrategy {
    fn name(&self) -> &str {
        DIRECT_STORE_NAME
    }

    async fn fetch(&self, customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        validate_customer_id(customer_id)?;
        self.store.load_dashboard(&DashboardLookup::for_customer(customer_id)).await
    }
}
