//! Circuit breaker modelled as an explicit finite-state machine
//!
//! ```text
//!            failures >= threshold               now >= open_until
//!   Closed ─────────────────────────▶ Open ─────────────────────────▶ HalfOpen
//!     ▲                                ▲                                 │
//!     │          probe succeeded       │          probe failed           │
//!     └────────────────────────────────┼─────────────────────────────────┤
//!                                      └─────────────────────────────────┘
//! ```
//!
//! All state lives in [`BreakerMachine`], a plain value whose only mutator is
//! [`BreakerMachine::apply`]. The transition function is pure (time is passed
//! in), so every edge of the diagram, including the HalfOpen probe race, can
//! be exercised without async code or real delays. [`CircuitBreaker`] wraps
//! the machine in a mutex and adds the clock, counters and logging.
//!
//! HalfOpen admits exactly one probe: the call that observes the
//! Open → HalfOpen edge. Any call arriving while that probe is in flight is
//! rejected as if the circuit were still open.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::clock::{Clock, SystemClock};

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors returned by [`CircuitBreaker::execute`].
///
/// Generic over the protected operation's error type so the original error
/// is preserved untouched inside `OperationFailed`.
#[derive(Debug, Error)]
pub enum ResilienceError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Circuit breaker is open, rejecting calls
    #[error("Circuit breaker is open, rejecting calls")]
    CircuitOpen { retry_after: Option<Duration> },

    /// The underlying operation failed
    #[error("Operation failed")]
    OperationFailed {
        #[source]
        source: E,
    },
}

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

//==============================================================================
// State Machine
//==============================================================================

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// Circuit is half-open, allowing a single probe to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Observable breaker state.
///
/// `open_until` is `Some` exactly when `state == Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerState {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub open_until: Option<Instant>,
}

/// Kind of admission granted to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    /// Regular call admitted while Closed
    Normal,
    /// The single HalfOpen trial call
    Probe,
}

/// Inputs to the transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerEvent {
    /// A call wants to proceed
    Arrival,
    /// An admitted call succeeded
    Success(Permit),
    /// An admitted call failed
    Failure(Permit),
    /// An admitted call finished without a verdict (caller fault, dropped
    /// future)
    Release(Permit),
}

/// Result of applying a [`BreakerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Admitted(Permit),
    Rejected { retry_after: Option<Duration> },
    Recorded,
    /// Outcome of a call admitted under an earlier state; no effect
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed { failures: u32 },
    Open { failures: u32, until: Instant },
    HalfOpen { failures: u32, probe_in_flight: bool },
}

/// Pure breaker state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerMachine {
    phase: Phase,
}

impl Default for BreakerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerMachine {
    /// A closed breaker with no recorded failures.
    pub fn new() -> Self {
        Self { phase: Phase::Closed { failures: 0 } }
    }

    /// Current observable state.
    pub fn snapshot(&self) -> CircuitBreakerState {
        match self.phase {
            Phase::Closed { failures } => CircuitBreakerState {
                state: CircuitState::Closed,
                consecutive_failures: failures,
                open_until: None,
            },
            Phase::Open { failures, until } => CircuitBreakerState {
                state: CircuitState::Open,
                consecutive_failures: failures,
                open_until: Some(until),
            },
            Phase::HalfOpen { failures, .. } => CircuitBreakerState {
                state: CircuitState::HalfOpen,
                consecutive_failures: failures,
                open_until: None,
            },
        }
    }

    /// Whether the HalfOpen probe is currently outstanding.
    pub fn probe_in_flight(&self) -> bool {
        matches!(self.phase, Phase::HalfOpen { probe_in_flight: true, .. })
    }

    /// Apply one event at instant `now`.
    pub fn apply(
        &mut self,
        event: BreakerEvent,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> Transition {
        let reopen = |failures: u32| Phase::Open {
            failures,
            until: now.checked_add(config.reset_timeout).unwrap_or(now),
        };

        let (next, transition) = match (self.phase, event) {
            (Phase::Closed { .. }, BreakerEvent::Arrival) => {
                (self.phase, Transition::Admitted(Permit::Normal))
            }
            (Phase::Open { until, .. }, BreakerEvent::Arrival) if now < until => (
                self.phase,
                Transition::Rejected { retry_after: Some(until.saturating_duration_since(now)) },
            ),
            (Phase::Open { failures, .. }, BreakerEvent::Arrival)
            | (Phase::HalfOpen { failures, probe_in_flight: false }, BreakerEvent::Arrival) => (
                Phase::HalfOpen { failures, probe_in_flight: true },
                Transition::Admitted(Permit::Probe),
            ),
            (Phase::HalfOpen { probe_in_flight: true, .. }, BreakerEvent::Arrival) => {
                (self.phase, Transition::Rejected { retry_after: None })
            }

            (Phase::Closed { .. }, BreakerEvent::Success(_)) => {
                (Phase::Closed { failures: 0 }, Transition::Recorded)
            }
            (Phase::Closed { failures }, BreakerEvent::Failure(_)) => {
                let failures = failures.saturating_add(1);
                if failures >= config.failure_threshold {
                    (reopen(failures), Transition::Recorded)
                } else {
                    (Phase::Closed { failures }, Transition::Recorded)
                }
            }

            (Phase::HalfOpen { .. }, BreakerEvent::Success(Permit::Probe)) => {
                (Phase::Closed { failures: 0 }, Transition::Recorded)
            }
            (Phase::HalfOpen { failures, .. }, BreakerEvent::Failure(Permit::Probe)) => {
                (reopen(failures.saturating_add(1)), Transition::Recorded)
            }
            (Phase::HalfOpen { failures, .. }, BreakerEvent::Release(Permit::Probe)) => {
                (Phase::HalfOpen { failures, probe_in_flight: false }, Transition::Recorded)
            }

            // Stale outcomes from calls admitted before the circuit opened,
            // and releases that carry no verdict.
            (_, BreakerEvent::Success(_))
            | (_, BreakerEvent::Failure(_))
            | (_, BreakerEvent::Release(_)) => (self.phase, Transition::Ignored),
        };

        self.phase = next;
        transition
    }
}

//==============================================================================
// Configuration
//==============================================================================

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a probe
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, reset_timeout: Duration::from_secs(30) }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        if self.reset_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                message: "reset_timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.config.reset_timeout = timeout;
        self
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//==============================================================================
// Circuit Breaker
//==============================================================================

/// Circuit breaker metrics for monitoring
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitBreakerState,
    pub admitted_calls: u64,
    pub rejected_calls: u64,
}

/// Thread-safe circuit breaker with an injectable clock.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    machine: Mutex<BreakerMachine>,
    clock: C,
    admitted_calls: AtomicU64,
    rejected_calls: AtomicU64,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("admitted_calls", &self.admitted_calls.load(Ordering::Relaxed))
            .field("rejected_calls", &self.rejected_calls.load(Ordering::Relaxed))
            .finish()
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker using the system clock
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a circuit breaker with a custom clock (useful for testing)
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            machine: Mutex::new(BreakerMachine::new()),
            clock,
            admitted_calls: AtomicU64::new(0),
            rejected_calls: AtomicU64::new(0),
        })
    }

    /// The breaker's configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask to run one call.
    ///
    /// On rejection returns the remaining cool-down, when known.
    pub fn try_acquire(&self) -> Result<CallPermit<'_, C>, Option<Duration>> {
        match self.apply(BreakerEvent::Arrival) {
            Transition::Admitted(permit) => {
                self.admitted_calls.fetch_add(1, Ordering::Relaxed);
                Ok(CallPermit { breaker: self, permit, settled: false })
            }
            Transition::Rejected { retry_after } => {
                self.rejected_calls.fetch_add(1, Ordering::Relaxed);
                debug!(state = %self.state().state, "Circuit breaker rejecting call");
                Err(retry_after)
            }
            Transition::Recorded | Transition::Ignored => {
                unreachable_arrival();
                Err(None)
            }
        }
    }

    /// Execute an operation with circuit breaker protection
    ///
    /// Every error counts as a failure.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.execute_classified(operation, |_| true).await
    }

    /// Execute an operation, counting only errors for which `is_failure`
    /// returns true against the circuit.
    ///
    /// Errors that are not failures release the permit without a verdict.
    #[instrument(skip_all, fields(state = %self.state().state))]
    pub async fn execute_classified<F, Fut, T, E, P>(
        &self,
        operation: F,
        is_failure: P,
    ) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
        P: Fn(&E) -> bool,
    {
        let permit = self
            .try_acquire()
            .map_err(|retry_after| ResilienceError::CircuitOpen { retry_after })?;

        match operation().await {
            Ok(value) => {
                permit.record_success();
                Ok(value)
            }
            Err(error) => {
                if is_failure(&error) {
                    permit.record_failure();
                } else {
                    permit.release();
                }
                Err(ResilienceError::OperationFailed { source: error })
            }
        }
    }

    /// Get the current state of the circuit breaker
    pub fn state(&self) -> CircuitBreakerState {
        self.machine.lock().snapshot()
    }

    /// Get circuit breaker metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        CircuitBreakerMetrics {
            state: self.state(),
            admitted_calls: self.admitted_calls.load(Ordering::Relaxed),
            rejected_calls: self.rejected_calls.load(Ordering::Relaxed),
        }
    }

    /// Reset the circuit breaker to closed state
    pub fn reset(&self) {
        *self.machine.lock() = BreakerMachine::new();
        info!("Circuit breaker manually reset to closed state");
    }

    fn apply(&self, event: BreakerEvent) -> Transition {
        let now = self.clock.now();
        let (before, after, transition) = {
            let mut machine = self.machine.lock();
            let before = machine.snapshot();
            let transition = machine.apply(event, now, &self.config);
            (before, machine.snapshot(), transition)
        };

        if before.state != after.state {
            log_state_change(&before, &after);
        }
        if transition == Transition::Ignored {
            debug!(?event, state = %after.state, "Ignoring stale circuit breaker outcome");
        }
        transition
    }
}

fn log_state_change(before: &CircuitBreakerState, after: &CircuitBreakerState) {
    match (before.state, after.state) {
        (CircuitState::Closed, CircuitState::Open) => warn!(
            consecutive_failures = after.consecutive_failures,
            "Circuit breaker opened after consecutive failures"
        ),
        (CircuitState::HalfOpen, CircuitState::Open) => warn!(
            consecutive_failures = after.consecutive_failures,
            "Circuit breaker re-opened after failed probe"
        ),
        (CircuitState::Open, CircuitState::HalfOpen) => {
            info!("Circuit breaker half-open, admitting probe")
        }
        (from, to) => info!(%from, %to, "Circuit breaker state changed"),
    }
}

#[cold]
fn unreachable_arrival() {
    warn!("Circuit breaker arrival produced no admission decision");
}

/// Admission ticket for one call.
///
/// Settle it with [`record_success`](Self::record_success),
/// [`record_failure`](Self::record_failure) or [`release`](Self::release).
/// Dropping an unsettled permit releases it, so an abandoned probe never
/// wedges the breaker in HalfOpen.
#[must_use = "an unsettled permit is released on drop without a verdict"]
pub struct CallPermit<'a, C: Clock> {
    breaker: &'a CircuitBreaker<C>,
    permit: Permit,
    settled: bool,
}

impl<C: Clock> CallPermit<'_, C> {
    /// Whether this call is the HalfOpen probe.
    pub fn kind(&self) -> Permit {
        self.permit
    }

    pub fn record_success(mut self) {
        self.settle(BreakerEvent::Success(self.permit));
    }

    pub fn record_failure(mut self) {
        self.settle(BreakerEvent::Failure(self.permit));
    }

    pub fn release(mut self) {
        self.settle(BreakerEvent::Release(self.permit));
    }

    fn settle(&mut self, event: BreakerEvent) {
        self.settled = true;
        self.breaker.apply(event);
    }
}

impl<C: Clock> Drop for CallPermit<'_, C> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(BreakerEvent::Release(self.permit));
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the breaker state machine and its thread-safe wrapper.

    use std::sync::{Arc, Barrier};

    use super::*;
    use crate::resilience::clock::MockClock;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    fn config(threshold: u32, reset_ms: u64) -> CircuitBreakerConfig {
        CircuitBreakerConfig::builder()
            .failure_threshold(threshold)
            .reset_timeout(Duration::from_millis(reset_ms))
            .build()
            .expect("valid config")
    }

    // =========================================================================
    // Machine Tests
    // =========================================================================

    #[test]
    fn test_machine_starts_closed() {
        let machine = BreakerMachine::new();
        let state = machine.snapshot();
        assert_eq!(state.state, CircuitState::Closed);
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.open_until, None);
    }

    #[test]
    fn test_machine_opens_exactly_at_threshold() {
        let cfg = config(3, 1_000);
        let now = Instant::now();
        let mut machine = BreakerMachine::new();

        for expected in 1..3 {
            assert_eq!(machine.apply(BreakerEvent::Arrival, now, &cfg), Transition::Admitted(Permit::Normal));
            machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
            let state = machine.snapshot();
            assert_eq!(state.state, CircuitState::Closed);
            assert_eq!(state.consecutive_failures, expected);
        }

        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        let state = machine.snapshot();
        assert_eq!(state.state, CircuitState::Open);
        assert_eq!(state.open_until, Some(now + Duration::from_millis(1_000)));
    }

    #[test]
    fn test_machine_success_resets_failures_when_closed() {
        let cfg = config(3, 1_000);
        let now = Instant::now();
        let mut machine = BreakerMachine::new();

        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        machine.apply(BreakerEvent::Success(Permit::Normal), now, &cfg);

        assert_eq!(machine.snapshot().consecutive_failures, 0);
        assert_eq!(machine.snapshot().state, CircuitState::Closed);
    }

    #[test]
    fn test_machine_rejects_before_deadline_and_probes_at_deadline() {
        let cfg = config(1, 500);
        let now = Instant::now();
        let mut machine = BreakerMachine::new();
        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);

        let early = now + Duration::from_millis(499);
        assert_eq!(
            machine.apply(BreakerEvent::Arrival, early, &cfg),
            Transition::Rejected { retry_after: Some(Duration::from_millis(1)) }
        );

        let deadline = now + Duration::from_millis(500);
        assert_eq!(machine.apply(BreakerEvent::Arrival, deadline, &cfg), Transition::Admitted(Permit::Probe));
        assert_eq!(machine.snapshot().state, CircuitState::HalfOpen);
        assert_eq!(machine.snapshot().open_until, None);
        assert!(machine.probe_in_flight());

        // A second arrival while the probe is outstanding is turned away.
        assert_eq!(
            machine.apply(BreakerEvent::Arrival, deadline, &cfg),
            Transition::Rejected { retry_after: None }
        );
    }

    #[test]
    fn test_machine_probe_success_closes() {
        let cfg = config(1, 100);
        let now = Instant::now();
        let later = now + Duration::from_millis(100);
        let mut machine = BreakerMachine::new();
        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        machine.apply(BreakerEvent::Arrival, later, &cfg);

        machine.apply(BreakerEvent::Success(Permit::Probe), later, &cfg);

        assert_eq!(machine.snapshot(), BreakerMachine::new().snapshot());
    }

    #[test]
    fn test_machine_probe_failure_reopens_with_fresh_deadline() {
        let cfg = config(1, 100);
        let now = Instant::now();
        let later = now + Duration::from_millis(250);
        let mut machine = BreakerMachine::new();
        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        machine.apply(BreakerEvent::Arrival, later, &cfg);

        machine.apply(BreakerEvent::Failure(Permit::Probe), later, &cfg);

        let state = machine.snapshot();
        assert_eq!(state.state, CircuitState::Open);
        assert_eq!(state.open_until, Some(later + Duration::from_millis(100)));
        assert_eq!(state.consecutive_failures, 2);
    }

    #[test]
    fn test_machine_released_probe_frees_the_slot() {
        let cfg = config(1, 100);
        let now = Instant::now();
        let later = now + Duration::from_millis(100);
        let mut machine = BreakerMachine::new();
        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        machine.apply(BreakerEvent::Arrival, later, &cfg);

        machine.apply(BreakerEvent::Release(Permit::Probe), later, &cfg);

        assert!(!machine.probe_in_flight());
        assert_eq!(machine.apply(BreakerEvent::Arrival, later, &cfg), Transition::Admitted(Permit::Probe));
    }

    #[test]
    fn test_machine_ignores_stale_outcomes_while_open() {
        let cfg = config(1, 100);
        let now = Instant::now();
        let mut machine = BreakerMachine::new();
        machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg);
        let opened = machine.snapshot();

        assert_eq!(machine.apply(BreakerEvent::Success(Permit::Normal), now, &cfg), Transition::Ignored);
        assert_eq!(machine.apply(BreakerEvent::Failure(Permit::Normal), now, &cfg), Transition::Ignored);
        assert_eq!(machine.snapshot(), opened);
    }

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_circuit_state_display() {
        assert_eq!(CircuitState::Closed.to_string(), "CLOSED");
        assert_eq!(CircuitState::Open.to_string(), "OPEN");
        assert_eq!(CircuitState::HalfOpen.to_string(), "HALF_OPEN");
    }

    #[test]
    fn test_config_validation() {
        assert!(CircuitBreakerConfig::builder().failure_threshold(0).build().is_err());
        assert!(CircuitBreakerConfig::builder().reset_timeout(Duration::ZERO).build().is_err());
        assert!(CircuitBreakerConfig::default().validate().is_ok());
    }

    // =========================================================================
    // Circuit Breaker Tests
    // =========================================================================

    #[tokio::test]
    async fn test_execute_opens_and_short_circuits() {
        let clock = MockClock::new();
        let breaker = CircuitBreaker::with_clock(config(2, 1_000), clock.clone()).expect("breaker");

        for _ in 0..2 {
            let result: ResilienceResult<(), Boom> = breaker.execute(|| async { Err(Boom) }).await;
            assert!(matches!(result, Err(ResilienceError::OperationFailed { .. })));
        }
        assert_eq!(breaker.state().state, CircuitState::Open);

        let mut invoked = false;
        let result: ResilienceResult<(), Boom> = breaker
            .execute(|| {
                invoked = true;
                async { Ok(()) }
            })
            .await;
        assert!(matches!(result, Err(ResilienceError::CircuitOpen { retry_after: Some(_) })));
        assert!(!invoked, "inner operation must not run while open");

        clock.advance_millis(1_000);
        let result: ResilienceResult<u8, Boom> = breaker.execute(|| async { Ok(7) }).await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(breaker.state().state, CircuitState::Closed);

        let metrics = breaker.metrics();
        assert_eq!(metrics.admitted_calls, 3);
        assert_eq!(metrics.rejected_calls, 1);
    }

    #[tokio::test]
    async fn test_execute_classified_skips_non_failures() {
        let breaker = CircuitBreaker::new(config(1, 1_000)).expect("breaker");

        let result: ResilienceResult<(), Boom> =
            breaker.execute_classified(|| async { Err(Boom) }, |_| false).await;

        assert!(result.is_err());
        assert_eq!(breaker.state().state, CircuitState::Closed);
        assert_eq!(breaker.state().consecutive_failures, 0);
    }

    #[test]
    fn test_dropped_permit_releases_probe() {
        let clock = MockClock::new();
        let breaker = CircuitBreaker::with_clock(config(1, 10), clock.clone()).expect("breaker");
        breaker.try_acquire().expect("closed").record_failure();
        clock.advance_millis(10);

        {
            let probe = breaker.try_acquire().expect("probe admitted");
            assert_eq!(probe.kind(), Permit::Probe);
            assert!(breaker.try_acquire().is_err());
        }

        assert_eq!(breaker.try_acquire().expect("slot freed").kind(), Permit::Probe);
    }

    #[test]
    fn test_reset_closes_circuit() {
        let breaker = CircuitBreaker::new(config(1, 60_000)).expect("breaker");
        breaker.try_acquire().expect("closed").record_failure();
        assert_eq!(breaker.state().state, CircuitState::Open);

        breaker.reset();

        assert_eq!(breaker.state().state, CircuitState::Closed);
        assert!(breaker.try_acquire().is_ok());
    }

    #[test]
    fn test_concurrent_arrivals_admit_single_probe() {
        const THREADS: usize = 16;

        let clock = MockClock::new();
        let breaker = CircuitBreaker::with_clock(config(1, 50), clock.clone()).expect("breaker");
        breaker.try_acquire().expect("closed").record_failure();
        clock.advance_millis(50);

        let acquired = Barrier::new(THREADS);
        let admitted = Arc::new(AtomicU64::new(0));

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    let permit = breaker.try_acquire();
                    if permit.is_ok() {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                    // Hold permits until every thread has tried.
                    acquired.wait();
                    drop(permit);
                });
            }
        });

        assert_eq!(admitted.load(Ordering::SeqCst), 1);
        assert_eq!(breaker.metrics().rejected_calls, (THREADS - 1) as u64);
    }
}
