//! Subscription tests over process-local regions

use super::*;
use crate::clock::RelayClock;
use crate::config::RelayConfig;
use crate::plugin::SharedMemoryPlugin;
use crate::region::{HeapBackend, HeapRegion};
use crate::stream::DistinctExt;
use crate::test_utils::{grid_scoring, player_telemetry};
use std::time::Duration;
use tracing::info;

/// Run a short session on a heap-backed plugin and hand back its region.
fn published_region(vehicles: usize) -> HeapRegion {
    let (clock, mock) = RelayClock::mock();
    let mut plugin = SharedMemoryPlugin::with_clock(HeapBackend, RelayConfig::default(), clock);
    plugin.startup();
    plugin.start_session();
    plugin.enter_realtime();
    plugin.on_world_scoring(&grid_scoring(vehicles));
    mock.increment(Duration::from_millis(50));
    plugin.on_vehicle_telemetry(&player_telemetry());

    let region = plugin.publisher().region().cloned().expect("mapped");
    plugin.shutdown();
    region
}

#[tokio::test(start_paused = true)]
async fn subscription_delivers_published_frames() {
    let _ = tracing_subscriber::fmt::try_init();

    let subscription = FrameSubscription::from_view(published_region(6), UpdateRate::Native);
    assert_eq!(subscription.poll_hz(), 100.0);

    let frame = subscription.frames().next().await.expect("first frame");
    info!(vehicles = frame.active_vehicles().len(), "Received frame");

    assert_eq!(frame.active_vehicles().len(), 6);
    assert!(frame.in_realtime());
    assert_eq!(frame.active_vehicles()[0].driver_name(), "Driver 1");
    assert!(subscription.latest().is_some());
}

#[tokio::test(start_paused = true)]
async fn unchanged_region_collapses_to_one_frame() {
    let subscription = FrameSubscription::from_view(published_region(3), UpdateRate::Max(50));

    let frames: Vec<_> = subscription
        .frames()
        .take(5)
        .collect::<Vec<_>>()
        .await;
    assert_eq!(frames.len(), 5);

    let distinct = futures::stream::iter(frames).distinct().count().await;
    assert_eq!(distinct, 1);
}

#[tokio::test(start_paused = true)]
async fn latest_is_empty_before_first_poll() {
    let subscription = FrameSubscription::from_view(HeapRegion::new("idle"), UpdateRate::Native);
    assert!(subscription.latest().is_none());
}

#[tokio::test(start_paused = true)]
async fn closing_ends_open_streams() {
    let subscription = FrameSubscription::from_view(published_region(1), UpdateRate::Native);
    let mut frames = subscription.frames();

    assert!(frames.next().await.is_some());
    subscription.close();

    // Drain whatever was published before the driver stopped.
    while frames.next().await.is_some() {}
}
