//! Publish/subscribe monitor over execution events
//!
//! ## Recording
//! `record_event` runs three steps in order:
//! 1. derive alerts: `duration_ms > slow_query_threshold_ms` raises
//!    `SlowQuery`, an error or unsuccessful event raises `QueryError`
//! 2. append the event and its alerts to bounded history, evicting the
//!    oldest entries past `max_history`
//! 3. notify observers, the event first and then each alert, every
//!    notification going to all observers in subscription order
//!
//! History is committed before any observer runs, and the observer list is
//! copied out of its lock before fan-out, so an observer may subscribe or
//! unsubscribe from inside `update`.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashgate_domain::{Alert, ExecutionEvent, MonitorConfig, MonitorSummary};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, warn};

use super::{MonitorNotification, PerformanceObserver};

/// Handle returned by [`PerformanceMonitor::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct History {
    events: VecDeque<ExecutionEvent>,
    alerts: VecDeque<Alert>,
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, capacity: usize) {
    if buffer.len() >= capacity {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

type Subscriber = (SubscriptionId, Arc<dyn PerformanceObserver>);

pub struct PerformanceMonitor {
    slow_query_threshold_ms: u64,
    max_history: usize,
    history: Mutex<History>,
    observers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
    observer_failures: AtomicU64,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}

impl fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("slow_query_threshold_ms", &self.slow_query_threshold_ms)
            .field("max_history", &self.max_history)
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl PerformanceMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            slow_query_threshold_ms: config.slow_query_threshold_ms,
            max_history: config.max_history.max(1),
            history: Mutex::new(History::default()),
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            observer_failures: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn PerformanceObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(%id, observer = observer.name(), "Observer subscribed");
        self.observers.write().push((id, observer));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        before != observers.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Record one event and notify observers; returns the derived alerts.
    pub fn record_event(&self, event: ExecutionEvent) -> Vec<Alert> {
        let alerts = self.evaluate(&event);

        {
            let mut history = self.history.lock();
            push_bounded(&mut history.events, event.clone(), self.max_history);
            for alert in &alerts {
                push_bounded(&mut history.alerts, alert.clone(), self.max_history);
            }
        }

        let observers: Vec<Subscriber> = self.observers.read().clone();
        self.broadcast(&observers, &MonitorNotification::Event(&event));
        for alert in &alerts {
            self.broadcast(&observers, &MonitorNotification::Alert(alert));
        }

        alerts
    }

    pub fn get_summary(&self) -> MonitorSummary {
        let history = self.history.lock();
        MonitorSummary::from_history(history.events.iter(), history.alerts.iter())
    }

    /// The last `n` events, oldest first.
    pub fn recent_events(&self, n: usize) -> Vec<ExecutionEvent> {
        let history = self.history.lock();
        let skip = history.events.len().saturating_sub(n);
        history.events.iter().skip(skip).cloned().collect()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.history.lock().alerts.iter().cloned().collect()
    }

    /// Drop all history; subscriptions are kept.
    pub fn clear(&self) {
        let mut history = self.history.lock();
        history.events.clear();
        history.alerts.clear();
    }

    /// Number of observer updates that returned an error or panicked.
    pub fn observer_failures(&self) -> u64 {
        self.observer_failures.load(Ordering::Relaxed)
    }

    pub fn slow_query_threshold_ms(&self) -> u64 {
        self.slow_query_threshold_ms
    }

    fn evaluate(&self, event: &ExecutionEvent) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if event.duration_ms > self.slow_query_threshold_ms {
            alerts.push(Alert::slow_query(event, self.slow_query_threshold_ms));
        }
        if event.has_error() {
            alerts.push(Alert::query_error(event));
        }
        alerts
    }

    fn broadcast(&self, observers: &[Subscriber], notification: &MonitorNotification<'_>) {
        for (id, observer) in observers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.update(notification)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    self.observer_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(%id, observer = observer.name(), error = %err, "Observer update failed");
                }
                Err(_) => {
                    self.observer_failures.fetch_add(1, Ordering::Relaxed);
                    error!(%id, observer = observer.name(), "Observer panicked during update");
                }
            }
        }
    }
}
