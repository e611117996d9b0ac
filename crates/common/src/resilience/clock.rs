//! Time abstraction for testability
//!
//! Circuit breakers compare "now" against a cool-down deadline. Routing every
//! read of the current instant through [`Clock`] lets production code use
//! the monotonic system clock while tests drive time by hand with
//! [`MockClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed counter, so a test can hand one clone to a
/// breaker and keep another to advance time.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed_nanos: Arc::new(AtomicU64::new(0)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::AcqRel);
    }

    /// Advance the mock clock by milliseconds (convenience method)
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::Acquire))
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}
