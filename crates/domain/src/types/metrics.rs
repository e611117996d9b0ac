//! Latency snapshots and monitor summaries
//!
//! Percentiles use nearest-rank selection on the ascending latency sequence:
//! `index = floor(count * p)`, clamped to the last element. Both the metrics
//! decorator and the performance monitor report through these types, so the
//! two always agree on what "p95" means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::{Alert, AlertKind, ExecutionEvent};

/// Nearest-rank percentile of an ascending slice; `None` when empty.
///
/// `percentile` is a fraction in `[0, 1]` and is clamped into that range.
pub fn nearest_rank(sorted: &[u64], percentile: f64) -> Option<u64> {
    let last = sorted.len().checked_sub(1)?;
    let p = if percentile.is_nan() { 0.0 } else { percentile.clamp(0.0, 1.0) };
    let index = (sorted.len() as f64 * p).floor() as usize;
    sorted.get(index.min(last)).copied()
}

fn average(total_ms: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total_ms as f64 / count as f64
    }
}

/// Point-in-time view of a metrics decorator's tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_calls: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_duration_ms: u64,
    /// Every latency sample since the last reset, ascending
    pub sorted_latencies: Vec<u64>,
}

impl MetricsSnapshot {
    pub fn from_latencies(
        mut latencies: Vec<u64>,
        success_count: u64,
        failure_count: u64,
    ) -> Self {
        latencies.sort_unstable();
        let total_duration_ms = latencies.iter().fold(0_u64, |acc, ms| acc.saturating_add(*ms));
        Self {
            total_calls: success_count + failure_count,
            success_count,
            failure_count,
            total_duration_ms,
            sorted_latencies: latencies,
        }
    }

    pub fn percentile(&self, percentile: f64) -> Option<u64> {
        nearest_rank(&self.sorted_latencies, percentile)
    }

    pub fn p50(&self) -> Option<u64> {
        self.percentile(0.50)
    }

    pub fn p95(&self) -> Option<u64> {
        self.percentile(0.95)
    }

    pub fn p99(&self) -> Option<u64> {
        self.percentile(0.99)
    }

    pub fn average_ms(&self) -> f64 {
        average(self.total_duration_ms, self.total_calls)
    }

    /// Fraction of calls that failed, 0.0 with no calls.
    pub fn error_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.failure_count as f64 / self.total_calls as f64
        }
    }
}

/// Per-strategy slice of a [`MonitorSummary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyBreakdown {
    pub calls: u64,
    pub failures: u64,
    pub average_ms: f64,
    pub p95_ms: Option<u64>,
}

/// Aggregate view over a performance monitor's retained history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorSummary {
    pub total_events: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub slow_query_alerts: u64,
    pub query_error_alerts: u64,
    pub p50_ms: Option<u64>,
    pub p95_ms: Option<u64>,
    pub p99_ms: Option<u64>,
    pub average_ms: f64,
    pub by_strategy: BTreeMap<String, StrategyBreakdown>,
}

impl MonitorSummary {
    pub fn from_history<'a>(
        events: impl IntoIterator<Item = &'a ExecutionEvent>,
        alerts: impl IntoIterator<Item = &'a Alert>,
    ) -> Self {
        let mut latencies = Vec::new();
        let mut per_strategy: BTreeMap<String, (Vec<u64>, u64)> = BTreeMap::new();
        let mut error_count = 0_u64;

        for event in events {
            latencies.push(event.duration_ms);
            let (samples, failures) = per_strategy.entry(event.strategy_name.clone()).or_default();
            samples.push(event.duration_ms);
            if event.has_error() {
                error_count += 1;
                *failures += 1;
            }
        }

        let (mut slow_query_alerts, mut query_error_alerts) = (0_u64, 0_u64);
        for alert in alerts {
            match alert.kind {
                AlertKind::SlowQuery => slow_query_alerts += 1,
                AlertKind::QueryError => query_error_alerts += 1,
            }
        }

        let total = latencies.len() as u64;
        let overall = MetricsSnapshot::from_latencies(latencies, total - error_count, error_count);

        let by_strategy = per_strategy
            .into_iter()
            .map(|(name, (samples, failures))| {
                let calls = samples.len() as u64;
                let snapshot = MetricsSnapshot::from_latencies(samples, calls - failures, failures);
                let breakdown = StrategyBreakdown {
                    calls,
                    failures,
                    average_ms: snapshot.average_ms(),
                    p95_ms: snapshot.p95(),
                };
                (name, breakdown)
            })
            .collect();

        Self {
            total_events: overall.total_calls,
            success_count: overall.success_count,
            error_count,
            slow_query_alerts,
            query_error_alerts,
            p50_ms: overall.p50(),
            p95_ms: overall.p95(),
            p99_ms: overall.p99(),
            average_ms: overall.average_ms(),
            by_strategy,
        }
    }
}
