//! Driver spawns and manages the frame polling task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::layout::SharedFrame;
use crate::provider::FrameSource;

/// Consecutive source errors after which the driver gives up.
pub const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest frame; `None` before the first frame and after the source stops
    pub frames: watch::Receiver<Option<Arc<SharedFrame>>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns the task that owns a [`FrameSource`]
pub struct Driver;

impl Driver {
    /// Spawn the polling task for `source`. Must be called within a tokio runtime.
    pub fn spawn<S>(source: S) -> DriverChannels
    where
        S: FrameSource,
    {
        let (frame_tx, frame_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let cancel_task = cancel.clone();
        tokio::spawn(async move {
            Self::frame_reader_task(source, frame_tx, cancel_task).await;
        });

        DriverChannels { frames: frame_rx, cancel }
    }

    async fn frame_reader_task<S>(
        mut source: S,
        frame_tx: watch::Sender<Option<Arc<SharedFrame>>>,
        cancel: CancellationToken,
    ) where
        S: FrameSource,
    {
        info!(hz = source.poll_hz(), "Frame reader task started");
        let mut frame_count = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Frame reader cancelled");
                    break;
                }
                result = source.next_frame() => result,
            };

            match result {
                Ok(Some(frame)) => {
                    frame_count += 1;
                    error_count = 0;
                    trace!(frame_count, "Frame read");

                    if frame_tx.send(Some(Arc::from(frame))).is_err() {
                        debug!("Frame receivers dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Source closed after {} frames", frame_count);
                    let _ = frame_tx.send(None);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    error!("Source error ({}/{}): {}", error_count, MAX_CONSECUTIVE_ERRORS, e);

                    if error_count >= MAX_CONSECUTIVE_ERRORS || !e.is_retryable() {
                        error!("Giving up on frame source");
                        let _ = frame_tx.send(None);
                        break;
                    }

                    // 100ms, 200ms, 400ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        info!("Frame reader task ended (read {} frames)", frame_count);
    }
}
