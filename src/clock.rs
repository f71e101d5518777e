//! Monotonic clock used to time extrapolation.
//!
//! Wraps [`quanta::Clock`]. Production code uses the real clock; tests build a
//! mocked clock and advance it explicitly so elapsed times are deterministic.

use quanta::{Clock, Instant, Mock};
use std::sync::Arc;
use std::time::Duration;

/// Monotonic clock counting from an arbitrary reference instant.
///
/// Clones share the same source, including when mocked.
#[derive(Clone, Debug)]
pub struct RelayClock {
    inner: Clock,
    ref_time: Instant,
}

/// Handle controlling every clone of a mocked [`RelayClock`].
#[derive(Clone, Debug)]
pub struct RelayClockMock(Arc<Mock>);

impl RelayClockMock {
    pub fn increment(&self, amount: Duration) {
        self.0.increment(amount);
    }

    /// Moves time backwards. This breaks monotonicity on purpose.
    pub fn decrement(&self, amount: Duration) {
        self.0.decrement(amount);
    }
}

impl RelayClock {
    pub fn new() -> Self {
        let inner = Clock::new();
        let ref_time = inner.now();
        Self { inner, ref_time }
    }

    /// Clock that only moves when the returned mock is advanced.
    pub fn mock() -> (Self, RelayClockMock) {
        let (inner, mock) = Clock::mock();
        let ref_time = inner.now();
        (Self { inner, ref_time }, RelayClockMock(mock))
    }

    /// Time elapsed since the reference instant.
    #[inline]
    pub fn now(&self) -> Duration {
        self.inner.now().saturating_duration_since(self.ref_time)
    }
}

impl Default for RelayClock {
    fn default() -> Self {
        Self::new()
    }
}
