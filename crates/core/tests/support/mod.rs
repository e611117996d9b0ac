//! Shared test helpers for `dashgate-core` integration tests.
//!
//! In-memory gateways and observers so tests can focus on behaviour instead
//! of boilerplate. Every mock counts its calls.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dashgate_core::{
    CacheGateway, DashboardQuery, LogEntry, LogSink, MonitorNotification, ObserverError,
    PerformanceObserver, RecordStore,
};
use dashgate_domain::{
    CustomerId, CustomerSummary, DashboardError, DashboardLookup, DashboardRecord,
    DashboardResult, OrderStatus, OrderSummary,
};
use parking_lot::Mutex;

/// A found record with `orders` open orders, newest first.
pub fn sample_record(customer_id: CustomerId, orders: usize) -> DashboardRecord {
    let customer = CustomerSummary {
        id: customer_id,
        name: format!("Customer {customer_id}"),
        email: format!("customer{customer_id}@example.com"),
    };
    let orders = (0..orders)
        .map(|i| OrderSummary {
            id: customer_id * 100 + i as i64,
            total_amount: 10.0 * (i as f64 + 1.0),
            status: if i % 2 == 0 { OrderStatus::Pending } else { OrderStatus::Shipped },
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 31, 12, 0, 0)
                .single()
                .map(|t| t - chrono::Duration::days(i as i64))
                .unwrap_or_else(Utc::now),
        })
        .collect();
    DashboardRecord::new(Some(customer), orders)
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// Seeded in-memory store. Unknown customers come back as not-found.
#[derive(Default)]
pub struct MockStore {
    records: HashMap<CustomerId, DashboardRecord>,
    calls: AtomicU64,
    delay: Option<Duration>,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: DashboardRecord) -> Self {
        if let Some(customer) = record.customer() {
            self.records.insert(customer.id, record.clone());
        }
        self
    }

    /// Sleep on the tokio clock before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn load_dashboard(&self, lookup: &DashboardLookup) -> DashboardResult<DashboardRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DashboardError::store("connection refused"));
        }
        Ok(self.records.get(&lookup.customer_id).cloned().unwrap_or_else(DashboardRecord::not_found))
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Query that replays scripted results, then keeps answering with
/// `fallback`.
pub struct ScriptedQuery {
    name: String,
    script: Mutex<VecDeque<DashboardResult<DashboardRecord>>>,
    fallback: DashboardRecord,
    delay: Option<Duration>,
    calls: AtomicU64,
    completions: AtomicU64,
}

impl ScriptedQuery {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: sample_record(1, 2),
            delay: None,
            calls: AtomicU64::new(0),
            completions: AtomicU64::new(0),
        }
    }

    pub fn then(self, result: DashboardResult<DashboardRecord>) -> Self {
        self.script.lock().push_back(result);
        self
    }

    /// Queue `n` store failures.
    pub fn failing(self, n: usize) -> Self {
        (0..n).fold(self, |query, _| query.then(Err(DashboardError::store("temporarily down"))))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that ran to the end, delay included.
    pub fn completions(&self) -> u64 {
        self.completions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardQuery for ScriptedQuery {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _customer_id: CustomerId) -> DashboardResult<DashboardRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().pop_front();
        self.completions.fetch_add(1, Ordering::SeqCst);
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

// ---------------------------------------------------------------------------
// Caches
// ---------------------------------------------------------------------------

/// Map-backed cache that records the TTL of every write.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    ttls: Mutex<Vec<Duration>>,
    gets: AtomicU64,
    sets: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.entries.lock().insert(key.to_string(), value.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn last_ttl(&self) -> Option<Duration> {
        self.ttls.lock().last().copied()
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn get(&self, key: &str) -> DashboardResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> DashboardResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.ttls.lock().push(ttl);
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> DashboardResult<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    async fn flush_all(&self) -> DashboardResult<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

/// Cache whose reads and/or writes fail.
pub struct FailingCache {
    fail_reads: bool,
    fail_writes: bool,
    inner: MemoryCache,
}

impl FailingCache {
    pub fn reads() -> Self {
        Self { fail_reads: true, fail_writes: false, inner: MemoryCache::new() }
    }

    pub fn writes() -> Self {
        Self { fail_reads: false, fail_writes: true, inner: MemoryCache::new() }
    }

    pub fn everything() -> Self {
        Self { fail_reads: true, fail_writes: true, inner: MemoryCache::new() }
    }
}

#[async_trait]
impl CacheGateway for FailingCache {
    async fn get(&self, key: &str) -> DashboardResult<Option<Vec<u8>>> {
        if self.fail_reads {
            return Err(DashboardError::cache("read refused"));
        }
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> DashboardResult<()> {
        if self.fail_writes {
            return Err(DashboardError::cache("write refused"));
        }
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> DashboardResult<bool> {
        self.inner.delete(key).await
    }

    async fn flush_all(&self) -> DashboardResult<()> {
        self.inner.flush_all().await
    }
}

// ---------------------------------------------------------------------------
// Observers and sinks
// ---------------------------------------------------------------------------

/// Shared, ordered log of "observer:notification" lines.
pub type DeliveryLog = Arc<Mutex<Vec<String>>>;

pub fn delivery_log() -> DeliveryLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn describe(notification: &MonitorNotification<'_>) -> String {
    match notification {
        MonitorNotification::Event(event) => format!("event:{}", event.subject_id),
        MonitorNotification::Alert(alert) => format!("alert:{}", alert.kind),
    }
}

pub struct RecordingObserver {
    name: String,
    log: DeliveryLog,
}

impl RecordingObserver {
    pub fn new(name: &str, log: DeliveryLog) -> Self {
        Self { name: name.to_string(), log }
    }
}

impl PerformanceObserver for RecordingObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&self, notification: &MonitorNotification<'_>) -> Result<(), ObserverError> {
        self.log.lock().push(format!("{}:{}", self.name, describe(notification)));
        Ok(())
    }
}

pub struct FailingObserver;

impl PerformanceObserver for FailingObserver {
    fn name(&self) -> &str {
        "failing"
    }

    fn update(&self, _notification: &MonitorNotification<'_>) -> Result<(), ObserverError> {
        Err(ObserverError::Failed { message: "sink unavailable".to_string() })
    }
}

pub struct PanickingObserver;

impl PerformanceObserver for PanickingObserver {
    fn name(&self) -> &str {
        "panicking"
    }

    fn update(&self, _notification: &MonitorNotification<'_>) -> Result<(), ObserverError> {
        panic!("observer blew up");
    }
}

#[derive(Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}
