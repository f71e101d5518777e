//! Subscriptions to a published region
//!
//! A [`FrameSubscription`] owns the driver task polling a region and hands out
//! frame streams. Dropping it stops the task.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use rfshared::{FrameSubscription, UpdateRate};
//! use rfshared::stream::DistinctExt;
//!
//! # #[tokio::main]
//! # async fn main() -> rfshared::Result<()> {
//! let subscription = FrameSubscription::open("$rFactorShared$", UpdateRate::Max(20))?;
//! let mut frames = subscription.frames().distinct();
//! while let Some(frame) = frames.next().await {
//!     println!("{} vehicles on track", frame.active_vehicles().len());
//! }
//! # Ok(())
//! # }
//! ```

use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::driver::Driver;
use crate::layout::SharedFrame;
use crate::provider::FrameSource;
use crate::providers::RegionSource;
use crate::region::RegionView;
use crate::types::UpdateRate;

/// Live view of the frames published to a region
pub struct FrameSubscription {
    frames: watch::Receiver<Option<Arc<SharedFrame>>>,
    poll_hz: f64,
    cancel: CancellationToken,
}

impl FrameSubscription {
    /// Open the named region read-only and start polling it.
    pub fn open(name: &str, rate: UpdateRate) -> Result<Self> {
        let source = RegionSource::open(name, rate)?;
        info!(name, "Subscribed to shared region");
        Ok(Self::from_source(source))
    }

    /// Poll an already mapped view.
    pub fn from_view<V>(view: V, rate: UpdateRate) -> Self
    where
        V: RegionView + Send + 'static,
    {
        Self::from_source(RegionSource::new(view, rate))
    }

    /// Drive any frame source. Must be called within a tokio runtime.
    pub fn from_source<S: FrameSource>(source: S) -> Self {
        let poll_hz = source.poll_hz();
        let channels = Driver::spawn(source);
        Self { frames: channels.frames, poll_hz, cancel: channels.cancel }
    }

    /// Stream of polled frames
    ///
    /// Waits for the first frame, then yields the latest frame each time the
    /// driver publishes one. Slow consumers skip intermediate frames. The
    /// stream ends when the source stops.
    pub fn frames(&self) -> BoxStream<'static, Arc<SharedFrame>> {
        WatchStream::new(self.frames.clone())
            .skip_while(|frame| {
                let waiting = frame.is_none();
                async move { waiting }
            })
            .take_while(|frame| {
                let live = frame.is_some();
                async move { live }
            })
            .filter_map(|frame| async move { frame })
            .boxed()
    }

    /// Most recent frame, if any has been read
    pub fn latest(&self) -> Option<Arc<SharedFrame>> {
        self.frames.borrow().clone()
    }

    pub fn poll_hz(&self) -> f64 {
        self.poll_hz
    }

    /// Stop polling. Open streams end once the driver exits.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        debug!("Dropping frame subscription");
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests;
