//! Connection lifecycle for the store and cache adapters
//!
//! `new(config)` → `initialize()` → `record_store()` / `cache()` →
//! `shutdown()`. Accessors fail with a `Config` error outside the
//! initialized window.

use std::sync::Arc;

use dashgate_core::decorators::QueryChain;
use dashgate_core::monitor::PerformanceMonitor;
use dashgate_core::ports::{CacheGateway, RecordStore};
use dashgate_core::strategy;
use dashgate_domain::{Config, DashboardResult};
use parking_lot::RwLock;
use tokio::task;
use tracing::{info, instrument};

use crate::cache::MokaCacheGateway;
use crate::database::{DbManager, SqliteRecordStore};
use crate::errors::{InfraError, InfraResult};

#[derive(Clone)]
struct Resources {
    db: Arc<DbManager>,
    store: Arc<SqliteRecordStore>,
    cache: Arc<MokaCacheGateway>,
}

/// Owns the SQLite pool and the moka cache for the lifetime of the process.
pub struct ConnectionManager {
    config: Config,
    resources: RwLock<Option<Resources>>,
    init_lock: tokio::sync::Mutex<()>,
}

impl ConnectionManager {
    /// Validate `config`; nothing is opened until [`Self::initialize`].
    pub fn new(config: Config) -> DashboardResult<Self> {
        config.validate()?;
        Ok(Self { config, resources: RwLock::new(None), init_lock: tokio::sync::Mutex::new(()) })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.resources.read().is_some()
    }

    /// Open the pool, apply the schema, check connectivity and build the
    /// cache. Calling it again once initialized is a no-op.
    #[instrument(skip(self), fields(db_path = %self.config.store.path.display()))]
    pub async fn initialize(&self) -> DashboardResult<()> {
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return Ok(());
        }

        let path = self.config.store.path.clone();
        let pool_size = self.config.store.pool_size;
        let db = task::spawn_blocking(move || -> InfraResult<DbManager> {
            let db = DbManager::new(&path, pool_size)?;
            db.run_migrations()?;
            db.health_check()?;
            Ok(db)
        })
        .await
        .map_err(InfraError::from)??;

        let db = Arc::new(db);
        let resources = Resources {
            store: Arc::new(SqliteRecordStore::new(Arc::clone(&db))),
            cache: Arc::new(MokaCacheGateway::from_config(&self.config.cache)),
            db,
        };
        *self.resources.write() = Some(resources);

        info!(
            pool_size,
            cache_capacity = self.config.cache.max_capacity,
            "Connection manager initialized"
        );
        Ok(())
    }

    pub fn record_store(&self) -> DashboardResult<Arc<dyn RecordStore>> {
        let store: Arc<dyn RecordStore> = self.resources("record store")?.store;
        Ok(store)
    }

    /// The concrete SQLite store, for seeding and maintenance.
    pub fn sqlite_store(&self) -> DashboardResult<Arc<SqliteRecordStore>> {
        Ok(self.resources("record store")?.store)
    }

    pub fn cache(&self) -> DashboardResult<Arc<dyn CacheGateway>> {
        let cache: Arc<dyn CacheGateway> = self.resources("cache")?.cache;
        Ok(cache)
    }

    pub fn database(&self) -> DashboardResult<Arc<DbManager>> {
        Ok(self.resources("database")?.db)
    }

    /// Assemble the configured strategy under the default decorator stack.
    pub fn query_chain(
        &self,
        monitor: Option<Arc<PerformanceMonitor>>,
    ) -> DashboardResult<QueryChain> {
        let base = strategy::from_config(
            &self.config.strategy,
            &self.config.cache,
            self.record_store()?,
            self.cache()?,
        );
        QueryChain::from_config(base, &self.config.resilience, monitor)
    }

    /// Flush the cache and release the pool. Handles obtained earlier keep
    /// their connections alive until dropped.
    pub async fn shutdown(&self) -> DashboardResult<()> {
        let _guard = self.init_lock.lock().await;
        let Some(resources) = self.resources.write().take() else {
            return Ok(());
        };

        resources.cache.flush_all().await?;
        info!("Connection manager shut down");
        Ok(())
    }

    fn resources(&self, component: &'static str) -> InfraResult<Resources> {
        self.resources.read().clone().ok_or(InfraError::NotInitialized { component })
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("db_path", &self.config.store.path)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
