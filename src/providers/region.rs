//! Polling source over a mapped region

use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::layout::SharedFrame;
use crate::provider::FrameSource;
use crate::reader::{DEFAULT_READ_ATTEMPTS, read_consistent};
use crate::region::RegionView;
use crate::types::UpdateRate;
use crate::{RelayError, Result};

/// Source that copies the frame out of a region at a fixed rate.
///
/// The writer gives no change notification, so the region is polled. Every
/// poll yields a frame, changed or not; see
/// [`DistinctExt`](crate::stream::DistinctExt) to drop repeats.
pub struct RegionSource<V> {
    view: V,
    rate: UpdateRate,
    interval: Interval,
    read_attempts: usize,
    polls: u64,
}

impl<V: RegionView + Send + 'static> RegionSource<V> {
    /// Poll `view` at `rate`. Must be called within a tokio runtime.
    pub fn new(view: V, rate: UpdateRate) -> Self {
        let rate = rate.normalize();
        let mut interval = interval(rate.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(hz = rate.hz(), "Region source created");
        Self { view, rate, interval, read_attempts: DEFAULT_READ_ATTEMPTS, polls: 0 }
    }

    /// Double-copy attempts per poll before reporting a torn frame.
    pub fn with_read_attempts(mut self, attempts: usize) -> Self {
        self.read_attempts = attempts.max(1);
        self
    }

    pub fn rate(&self) -> UpdateRate {
        self.rate
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}

#[cfg(windows)]
impl RegionSource<crate::windows::ReadOnlyMapping> {
    /// Open the named region read-only and poll it.
    pub fn open(name: &str, rate: UpdateRate) -> Result<Self> {
        let mapping = crate::windows::ReadOnlyMapping::open(name)?;
        info!(name, hz = rate.hz(), "Reading shared region");
        Ok(Self::new(mapping, rate))
    }
}

#[cfg(not(windows))]
impl RegionSource<crate::region::HeapRegion> {
    /// Named regions only exist on Windows.
    pub fn open(name: &str, _rate: UpdateRate) -> Result<Self> {
        info!(name, "Shared region requested on a platform without named mappings");
        Err(RelayError::unsupported_platform("Reading a named shared region", "Windows"))
    }
}

#[async_trait::async_trait]
impl<V: RegionView + Send + 'static> FrameSource for RegionSource<V> {
    async fn next_frame(&mut self) -> Result<Option<Box<SharedFrame>>> {
        self.interval.tick().await;
        self.polls += 1;

        match read_consistent(&self.view, self.read_attempts) {
            Some(frame) => {
                trace!(poll = self.polls, "Frame copied");
                Ok(Some(frame))
            }
            None => Err(RelayError::reader(format!(
                "frame changed during {} consecutive copies",
                self.read_attempts
            ))),
        }
    }

    fn poll_hz(&self) -> f64 {
        f64::from(self.rate.hz())
    }
}
