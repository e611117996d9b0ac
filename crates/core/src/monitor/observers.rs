//! In-process observers
//!
//! - [`ConsoleObserver`] forwards notifications to `tracing`
//! - [`AggregatorObserver`] keeps per-strategy tallies and a bounded alert
//!   list in memory
//!
//! The durable JSON-lines observer lives in `dashgate-infra`.

use std::collections::{BTreeMap, VecDeque};

use dashgate_domain::constants::DEFAULT_AGGREGATOR_ALERT_CAPACITY;
use dashgate_domain::Alert;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{MonitorNotification, ObserverError, PerformanceObserver};

/// Logs events at `debug` (success) or `info` (failure) and alerts at `warn`.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl PerformanceObserver for ConsoleObserver {
    fn name(&self) -> &str {
        "console"
    }

    fn update(&self, notification: &MonitorNotification<'_>) -> Result<(), ObserverError> {
        match notification {
            MonitorNotification::Event(event) if event.success => debug!(
                strategy = %event.strategy_name,
                customer_id = event.subject_id,
                duration_ms = event.duration_ms,
                "Query executed"
            ),
            MonitorNotification::Event(event) => info!(
                strategy = %event.strategy_name,
                customer_id = event.subject_id,
                duration_ms = event.duration_ms,
                error = event.error_message.as_deref().unwrap_or(""),
                "Query failed"
            ),
            MonitorNotification::Alert(alert) => warn!(
                kind = %alert.kind,
                strategy = %alert.source_event.strategy_name,
                "{}",
                alert.message
            ),
        }
        Ok(())
    }
}

/// Counts for one strategy as seen by an [`AggregatorObserver`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyTally {
    pub events: u64,
    pub failures: u64,
    pub total_duration_ms: u64,
}

/// Point-in-time copy of an aggregator's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSnapshot {
    pub total_events: u64,
    pub total_alerts: u64,
    pub strategies: BTreeMap<String, StrategyTally>,
    /// Most recent alerts, oldest first
    pub recent_alerts: Vec<Alert>,
}

#[derive(Debug, Default)]
struct AggregateState {
    total_events: u64,
    total_alerts: u64,
    strategies: BTreeMap<String, StrategyTally>,
    alerts: VecDeque<Alert>,
}

#[derive(Debug)]
pub struct AggregatorObserver {
    alert_capacity: usize,
    state: Mutex<AggregateState>,
}

impl Default for AggregatorObserver {
    fn default() -> Self {
        Self::new(DEFAULT_AGGREGATOR_ALERT_CAPACITY)
    }
}

impl AggregatorObserver {
    pub fn new(alert_capacity: usize) -> Self {
        Self { alert_capacity: alert_capacity.max(1), state: Mutex::new(AggregateState::default()) }
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        let state = self.state.lock();
        AggregateSnapshot {
            total_events: state.total_events,
            total_alerts: state.total_alerts,
            strategies: state.strategies.clone(),
            recent_alerts: state.alerts.iter().cloned().collect(),
        }
    }

    pub fn reset(&self) {
        *self.state.lock() = AggregateState::default();
    }
}

impl PerformanceObserver for AggregatorObserver {
    fn name(&self) -> &str {
        "aggregator"
    }

    fn update(&self, notification: &MonitorNotification<'_>) -> Result<(), ObserverError> {
        let mut state = self.state.lock();
        match notification {
            MonitorNotification::Event(event) => {
                state.total_events += 1;
                let tally = state.strategies.entry(event.strategy_name.clone()).or_default();
                tally.events += 1;
                tally.total_duration_ms = tally.total_duration_ms.saturating_add(event.duration_ms);
                if event.has_error() {
                    tally.failures += 1;
                }
            }
            MonitorNotification::Alert(alert) => {
                state.total_alerts += 1;
                if state.alerts.len() >= self.alert_capacity {
                    state.alerts.pop_front();
                }
                state.alerts.push_back((*alert).clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dashgate_domain::{AlertKind, ExecutionEvent};

    use super::*;

    #[test]
    fn test_aggregator_tallies_by_strategy() {
        let aggregator = AggregatorObserver::default();
        let ok = ExecutionEvent::success("cache_aside", 1, Duration::from_millis(4));
        let failed = ExecutionEvent::failure("cache_aside", 2, Duration::from_millis(6), "down");
        let alert = Alert::query_error(&failed);

        aggregator.update(&MonitorNotification::Event(&ok)).expect("update");
        aggregator.update(&MonitorNotification::Event(&failed)).expect("update");
        aggregator.update(&MonitorNotification::Alert(&alert)).expect("update");

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.total_events, 2);
        assert_eq!(
            snapshot.strategies["cache_aside"],
            StrategyTally { events: 2, failures: 1, total_duration_ms: 10 }
        );
        assert_eq!(snapshot.recent_alerts.len(), 1);
        assert_eq!(snapshot.recent_alerts[0].kind, AlertKind::QueryError);
    }

    #[test]
    fn test_aggregator_alert_list_is_bounded() {
        let aggregator = AggregatorObserver::new(2);
        for id in 1..=3 {
            let event = ExecutionEvent::failure("hybrid", id, Duration::ZERO, "down");
            let alert = Alert::query_error(&event);
            aggregator.update(&MonitorNotification::Alert(&alert)).expect("update");
        }

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.total_alerts, 3);
        let ids: Vec<_> =
            snapshot.recent_alerts.iter().map(|alert| alert.source_event.subject_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_console_observer_never_fails() {
        let event = ExecutionEvent::success("direct_store", 1, Duration::ZERO);
        assert!(ConsoleObserver.update(&MonitorNotification::Event(&event)).is_ok());
    }
}
