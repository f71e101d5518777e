//! Host-facing plugin object.
//!
//! [`SharedMemoryPlugin`] is the context the simulator talks to: it owns the
//! region backend, the publisher and the session lifecycle, and exposes one
//! method per host callback. Callbacks never fail; problems are logged and the
//! plugin keeps answering.
//!
//! ```rust
//! use rfshared::{HeapBackend, SharedMemoryPlugin, RelayConfig, ScoringInfo};
//!
//! let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
//! plugin.startup();
//! plugin.start_session();
//! plugin.on_world_scoring(&ScoringInfo::default());
//! plugin.shutdown();
//! ```

use tracing::{info, warn};

use crate::clock::RelayClock;
use crate::config::RelayConfig;
use crate::extrapolation::PoseExtrapolator;
use crate::lifecycle::{LifecycleAction, SessionLifecycle};
use crate::logging;
use crate::publisher::FramePublisher;
use crate::region::{PlatformBackend, RegionBackend};
use crate::types::{ScoringInfo, TelemetryInfo};

/// Identity reported to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub full_name: &'static str,
    pub description: &'static str,
    pub sub_type: &'static str,
    pub version: u32,
}

pub const PLUGIN_INFO: PluginInfo = PluginInfo {
    name: "rFactorSharedMemoryMap",
    full_name: "rFactor Shared Memory Map Plugin",
    description: "Publishes telemetry and scoring to a named shared memory region",
    sub_type: "Internals",
    version: 3,
};

/// Lifecycle of the plugin instance itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Stopped,
}

/// Shared memory plugin bound to a region backend.
#[derive(Debug)]
pub struct SharedMemoryPlugin<B: RegionBackend> {
    backend: B,
    region_name: String,
    publisher: FramePublisher<B::Region>,
    lifecycle: SessionLifecycle,
    phase: Phase,
}

impl<B: RegionBackend> SharedMemoryPlugin<B> {
    pub fn new(backend: B, config: RelayConfig) -> Self {
        Self::with_clock(backend, config, RelayClock::new())
    }

    /// Plugin timed by `clock` instead of the system clock.
    pub fn with_clock(backend: B, config: RelayConfig, clock: RelayClock) -> Self {
        let extrapolator = PoseExtrapolator::new(config.extrapolation);
        Self {
            backend,
            region_name: config.region_name,
            publisher: FramePublisher::new(extrapolator, clock),
            lifecycle: SessionLifecycle::new(),
            phase: Phase::Created,
        }
    }

    pub fn info(&self) -> PluginInfo {
        PLUGIN_INFO
    }

    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    pub fn publisher(&self) -> &FramePublisher<B::Region> {
        &self.publisher
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    /// Whether the region is mapped and updates are published.
    pub fn is_publishing(&self) -> bool {
        self.publisher.is_mapped()
    }

    /// Map the region. Only the first call on an instance attempts it.
    pub fn startup(&mut self) {
        if self.phase != Phase::Created {
            warn!(phase = ?self.phase, "Startup already handled, ignoring");
            return;
        }
        self.phase = Phase::Running;

        info!(
            plugin = PLUGIN_INFO.name,
            version = PLUGIN_INFO.version,
            region = %self.region_name,
            "Starting shared memory plugin"
        );
        let acquired = self.backend.acquire(&self.region_name);
        self.publisher.attach(acquired);
    }

    /// Release the region. Safe to call on any path, any number of times.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.phase = Phase::Stopped;
        drop(self.publisher.detach());
        info!(plugin = PLUGIN_INFO.name, "Shared memory plugin stopped");
    }

    pub fn start_session(&mut self) {
        self.transition(SessionLifecycle::start_session);
    }

    pub fn end_session(&mut self) {
        self.transition(SessionLifecycle::end_session);
    }

    pub fn enter_realtime(&mut self) {
        self.transition(SessionLifecycle::enter_realtime);
    }

    pub fn exit_realtime(&mut self) {
        self.transition(SessionLifecycle::exit_realtime);
    }

    /// Run one lifecycle step. A disabled plugin keeps its state untouched.
    fn transition(&mut self, step: fn(&mut SessionLifecycle) -> LifecycleAction) {
        if self.publisher.is_disabled() {
            return;
        }
        let action = step(&mut self.lifecycle);
        match action {
            LifecycleAction::Reset => self.publisher.reset(),
            LifecycleAction::Realtime(in_realtime) => self.publisher.set_realtime(in_realtime),
        }
    }

    /// High-rate player telemetry.
    pub fn on_vehicle_telemetry(&mut self, info: &TelemetryInfo) {
        self.publisher.on_telemetry(info);
    }

    /// Low-rate scoring for the whole grid.
    pub fn on_world_scoring(&mut self, info: &ScoringInfo) {
        self.publisher.on_scoring(info);
    }

    pub fn wants_telemetry_updates(&self) -> bool {
        true
    }

    pub fn wants_scoring_updates(&self) -> bool {
        true
    }

    pub fn wants_graphics_updates(&self) -> bool {
        false
    }

    pub fn has_hardware_inputs(&self) -> bool {
        false
    }

    /// Force feedback is left to the simulator.
    pub fn force_feedback(&mut self) -> Option<f32> {
        None
    }

    /// Hardware controls are left to the simulator.
    pub fn check_hw_control(&mut self, _control_name: &str) -> Option<f32> {
        None
    }

    /// Commentary requests are never issued.
    pub fn request_commentary(&mut self) -> bool {
        false
    }
}

impl SharedMemoryPlugin<PlatformBackend> {
    /// Plugin for the current platform, configured from [`CONFIG_ENV`].
    ///
    /// Also installs the log subscriber. An unreadable configuration falls back
    /// to defaults.
    ///
    /// [`CONFIG_ENV`]: crate::config::CONFIG_ENV
    pub fn from_env() -> Self {
        let loaded = RelayConfig::from_env();
        let config = loaded.as_ref().cloned().unwrap_or_default();
        logging::init(&config.log_filter);
        if let Err(err) = loaded {
            warn!("Relay config rejected, using defaults: {err:#}");
        }
        Self::new(PlatformBackend::default(), config)
    }
}

impl<B: RegionBackend> Drop for SharedMemoryPlugin<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::SessionState;
    use crate::region::{FrameRegion, HeapBackend, HeapRegion};
    use crate::test_utils::{grid_scoring, player_telemetry};
    use crate::{RelayError, Result};
    use std::time::Duration;

    /// Backend whose create and open both fail.
    #[derive(Debug, Default)]
    struct FailingBackend {
        attempts: usize,
    }

    impl RegionBackend for FailingBackend {
        type Region = HeapRegion;

        fn acquire(&mut self, name: &str) -> Result<HeapRegion> {
            self.attempts += 1;
            Err(RelayError::region_open_failed(name, None))
        }
    }

    fn frame(plugin: &SharedMemoryPlugin<HeapBackend>) -> &crate::SharedFrame {
        plugin.publisher().region().expect("mapped").frame()
    }

    #[test]
    fn reports_plugin_identity() {
        let plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
        let info = plugin.info();
        assert_eq!(info.name, "rFactorSharedMemoryMap");
        assert_eq!(info.sub_type, "Internals");
        assert_eq!(info.version, 3);
        assert!(plugin.wants_telemetry_updates());
        assert!(plugin.wants_scoring_updates());
        assert!(!plugin.wants_graphics_updates());
        assert!(!plugin.has_hardware_inputs());
    }

    #[test]
    fn startup_maps_a_zeroed_region() {
        let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
        assert!(!plugin.is_publishing());
        plugin.startup();
        assert!(plugin.is_publishing());
        assert!(frame(&plugin).is_zeroed());
    }

    #[test]
    fn failed_mapping_turns_every_callback_into_a_no_op() {
        let mut plugin = SharedMemoryPlugin::new(FailingBackend::default(), RelayConfig::default());
        plugin.startup();
        assert!(plugin.publisher().is_disabled());

        plugin.start_session();
        plugin.enter_realtime();
        plugin.on_world_scoring(&grid_scoring(6));
        plugin.on_vehicle_telemetry(&player_telemetry());
        plugin.exit_realtime();
        plugin.end_session();

        assert!(plugin.publisher().cache().is_empty());
        assert!(plugin.publisher().region().is_none());
        assert!(!plugin.is_publishing());
    }

    #[test]
    fn failed_mapping_leaves_session_state_untouched() {
        let mut plugin = SharedMemoryPlugin::new(FailingBackend::default(), RelayConfig::default());
        plugin.startup();

        plugin.start_session();
        plugin.enter_realtime();

        assert_eq!(plugin.lifecycle().state(), SessionState::Idle);
        assert!(!plugin.lifecycle().in_realtime());
    }

    #[test]
    fn mapping_is_attempted_once() {
        let mut plugin = SharedMemoryPlugin::new(FailingBackend::default(), RelayConfig::default());
        plugin.startup();
        plugin.startup();
        plugin.shutdown();
        assert_eq!(plugin.backend.attempts, 1);
    }

    #[test]
    fn session_reset_restores_freshly_mapped_state() {
        let (clock, mock) = RelayClock::mock();
        let mut plugin =
            SharedMemoryPlugin::with_clock(HeapBackend, RelayConfig::default(), clock);
        plugin.startup();
        let fresh = *frame(&plugin);

        plugin.start_session();
        plugin.enter_realtime();
        plugin.on_world_scoring(&grid_scoring(8));
        mock.increment(Duration::from_millis(40));
        plugin.on_vehicle_telemetry(&player_telemetry());

        plugin.start_session();
        plugin.end_session();
        plugin.start_session();

        assert!(plugin.publisher().cache().is_empty());
        assert_eq!(*frame(&plugin), fresh);
        assert_eq!(plugin.publisher().elapsed_since_scoring(), 0.0);
    }

    #[test]
    fn realtime_hooks_write_the_flag() {
        let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
        plugin.startup();
        plugin.start_session();

        plugin.enter_realtime();
        assert!(frame(&plugin).in_realtime());
        assert!(plugin.lifecycle().in_realtime());

        plugin.exit_realtime();
        assert!(!frame(&plugin).in_realtime());
    }

    #[test]
    fn shutdown_releases_and_is_idempotent() {
        let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
        plugin.startup();
        plugin.shutdown();
        assert!(!plugin.is_publishing());
        plugin.shutdown();

        plugin.on_world_scoring(&grid_scoring(2));
        assert!(plugin.publisher().cache().is_empty());
    }

    #[test]
    fn shutdown_without_startup_is_harmless() {
        let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
        plugin.shutdown();
        plugin.startup();
        assert!(!plugin.is_publishing());
    }

    #[test]
    fn stub_hooks_are_not_handled() {
        let mut plugin = SharedMemoryPlugin::new(HeapBackend, RelayConfig::default());
        assert_eq!(plugin.force_feedback(), None);
        assert_eq!(plugin.check_hw_control("Throttle"), None);
        assert!(!plugin.request_commentary());
    }
}
