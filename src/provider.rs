//! Source trait for frame readers

use crate::Result;
use crate::layout::SharedFrame;

/// Source of published frames.
///
/// Sources handle their own pacing: `next_frame` waits until a frame is due
/// and returns it. The driver only loops and fans the frames out.
#[async_trait::async_trait]
pub trait FrameSource: Send + 'static {
    /// Get the next frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - Frame read
    /// - `Ok(None)` - Source closed (normal termination)
    /// - `Err(e)` - Read failed; the driver backs off and tries again
    async fn next_frame(&mut self) -> Result<Option<Box<SharedFrame>>>;

    /// Rate at which the source is polled, in Hz
    fn poll_hz(&self) -> f64;
}
