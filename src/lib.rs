//! Shared memory relay for rFactor telemetry and scoring.
//!
//! The simulator calls into the plugin with high-rate telemetry for the
//! player's car and low-rate scoring for the whole grid. The relay merges both
//! into one packed frame in a named shared memory region that external tools
//! read without talking to the simulator.
//!
//! # Features
//!
//! - **Byte-exact layout**: the frame is a packed `#[repr(C)]` struct shared
//!   with every reader of the region
//! - **Dead-reckoning**: between scoring updates, every vehicle's pose is
//!   predicted from its last authoritative state
//! - **Fail-safe publishing**: if the region cannot be mapped the plugin turns
//!   every callback into a no-op instead of failing the host
//! - **Reader side**: consistent snapshots and async frame streams for tools
//!   that consume the region
//!
//! ## Example (publishing)
//!
//! ```rust
//! use rfshared::{
//!     FrameRegion, HeapBackend, RelayConfig, ScoringInfo, SharedMemoryPlugin, TelemetryInfo,
//!     VehicleScoring,
//! };
//!
//! let scoring = ScoringInfo { vehicles: vec![VehicleScoring::default(); 12], ..Default::default() };
//!
//! let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
//! plugin.startup();
//! plugin.start_session();
//! plugin.on_world_scoring(&scoring);
//! plugin.on_vehicle_telemetry(&TelemetryInfo::default());
//!
//! let frame = plugin.publisher().region().unwrap().frame();
//! assert_eq!(frame.active_vehicles().len(), 12);
//! ```
//!
//! ## Example (reading)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use rfshared::{FrameSubscription, UpdateRate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subscription = FrameSubscription::open("$rFactorShared$", UpdateRate::Native)?;
//!     let mut frames = subscription.frames();
//!
//!     while let Some(frame) = frames.next().await {
//!         let speed = frame.speed;
//!         println!("Speed: {speed}");
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Configuration and logging
pub mod config;
pub mod logging;

// Publishing
pub mod cache;
pub mod clock;
pub mod extrapolation;
pub mod layout;
pub mod lifecycle;
pub mod plugin;
pub mod publisher;
pub mod region;

// Reading
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod reader;
pub mod stream;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use error::*;
pub use types::*;

pub use cache::KinematicStateCache;
pub use clock::{RelayClock, RelayClockMock};
pub use config::RelayConfig;
pub use extrapolation::{ExtrapolationConfig, PoseExtrapolator, PredictedPose};
pub use layout::{MAX_VEHICLES, SHARED_FRAME_SIZE, SharedFrame, SharedVehicle, SharedWheel};
pub use lifecycle::{SessionLifecycle, SessionState};
pub use plugin::{PLUGIN_INFO, PluginInfo, SharedMemoryPlugin};
pub use publisher::FramePublisher;
pub use region::{
    DEFAULT_REGION_NAME, FrameRegion, HeapBackend, HeapRegion, PlatformBackend, RegionBackend,
    RegionView,
};

// Reader exports
pub use connection::FrameSubscription;
pub use reader::read_consistent;

// Windows memory exports
#[cfg(windows)]
pub use crate::windows::{ReadOnlyMapping, WindowsBackend, WritableMapping};
