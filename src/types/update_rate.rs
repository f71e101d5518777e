//! Poll rate control for readers of the shared region

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default reader poll rate. The writer publishes at the telemetry rate, which
/// rarely exceeds this.
pub const NATIVE_POLL_HZ: u32 = 100;

/// Update rate for frame subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Poll at the native rate ([`NATIVE_POLL_HZ`])
    Native,

    /// Poll at most this many times per second.
    /// Rates above the native rate (and zero) fall back to Native.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the native poll rate
    pub fn normalize(self) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(hz) if hz == 0 || hz >= NATIVE_POLL_HZ => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Effective polls per second
    pub fn hz(self) -> u32 {
        match self.normalize() {
            UpdateRate::Native => NATIVE_POLL_HZ,
            UpdateRate::Max(hz) => hz,
        }
    }

    /// Interval between polls
    pub fn poll_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.hz()))
    }
}
