//! Merges telemetry, scoring and predicted poses into the shared frame.
//!
//! Merge policy:
//!
//! - Scoring fields are authoritative and monotonic: each scoring update fully
//!   supersedes the previous one.
//! - Per-vehicle poses are authoritative at the instant of a scoring update
//!   (`delta_time == 0`) and degrade to predictions until the next one. The
//!   next scoring update overwrites the prediction outright; there is no
//!   blending.
//! - Player telemetry is copied verbatim on every telemetry callback.
//!
//! Related fields are written together (one vehicle entry or one wheel at a
//! time) to keep the window in which readers can see a torn frame short.
//!
//! While no region is mapped every publish call is a no-op and nothing is
//! cached.

use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::cache::KinematicStateCache;
use crate::clock::RelayClock;
use crate::extrapolation::{PoseExtrapolator, PredictedPose};
use crate::layout::{
    SharedFrame, SharedVec3, SharedVehicle, SharedWheel, encode_c_str, write_c_str,
};
use crate::region::FrameRegion;
use crate::types::{ScoringInfo, TelemetryInfo, VehicleScoring, WheelTelemetry};
use crate::{RelayError, Result};

/// Mapping state of the publisher.
#[derive(Debug)]
pub enum RegionState<R> {
    /// No mapping attempted yet, or released at shutdown.
    Unmapped,
    /// Region mapped and owned by this publisher.
    Mapped(R),
    /// Mapping failed; publishing stays off until the process restarts.
    Disabled,
}

/// Single writer of the shared frame.
#[derive(Debug)]
pub struct FramePublisher<R> {
    state: RegionState<R>,
    cache: KinematicStateCache,
    extrapolator: PoseExtrapolator,
    clock: RelayClock,
    sync_origin: Option<Duration>,
}

impl<R: FrameRegion> FramePublisher<R> {
    pub fn new(extrapolator: PoseExtrapolator, clock: RelayClock) -> Self {
        Self {
            state: RegionState::Unmapped,
            cache: KinematicStateCache::new(),
            extrapolator,
            clock,
            sync_origin: None,
        }
    }

    /// Take the outcome of a mapping attempt.
    ///
    /// A mapped region is zeroed before use. A failure leaves the publisher
    /// disabled for good, and a disabled publisher ignores later attempts.
    pub fn attach(&mut self, acquired: Result<R>) {
        if matches!(self.state, RegionState::Disabled) {
            warn!("Publisher disabled, ignoring region");
            return;
        }

        match acquired {
            Ok(mut region) => {
                *region.frame_mut() = SharedFrame::zeroed();
                self.state = RegionState::Mapped(region);
                self.reset_tracking();
                info!("Shared region mapped, publishing enabled");
            }
            Err(err) => {
                self.disable(&err);
            }
        }
    }

    fn disable(&mut self, err: &RelayError) {
        warn!(
            error = %err,
            suggestions = ?err.recovery_suggestions(),
            "Shared region unavailable, publishing disabled until restart"
        );
        self.state = RegionState::Disabled;
        self.reset_tracking();
    }

    /// Release the region. A disabled publisher stays disabled.
    pub fn detach(&mut self) -> Option<R> {
        let previous = std::mem::replace(&mut self.state, RegionState::Unmapped);
        self.reset_tracking();
        match previous {
            RegionState::Mapped(region) => {
                info!("Shared region released");
                Some(region)
            }
            RegionState::Disabled => {
                self.state = RegionState::Disabled;
                None
            }
            RegionState::Unmapped => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.state, RegionState::Mapped(_))
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.state, RegionState::Disabled)
    }

    pub fn region(&self) -> Option<&R> {
        match &self.state {
            RegionState::Mapped(region) => Some(region),
            _ => None,
        }
    }

    pub fn cache(&self) -> &KinematicStateCache {
        &self.cache
    }

    pub fn extrapolator(&self) -> &PoseExtrapolator {
        &self.extrapolator
    }

    /// Seconds since the last scoring update, 0 before the first one.
    pub fn elapsed_since_scoring(&self) -> f64 {
        self.sync_origin
            .map(|origin| self.clock.now().saturating_sub(origin).as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Clear the cache and the synchronization origin and zero the frame.
    pub fn reset(&mut self) {
        self.reset_tracking();
        if let RegionState::Mapped(region) = &mut self.state {
            *region.frame_mut() = SharedFrame::zeroed();
        }
        debug!("Publisher reset");
    }

    fn reset_tracking(&mut self) {
        self.cache.clear();
        self.sync_origin = None;
    }

    /// Publish a scoring update: authoritative scoring fields and exact poses.
    pub fn on_scoring(&mut self, info: &ScoringInfo) {
        let RegionState::Mapped(region) = &mut self.state else {
            return;
        };

        let now = self.clock.now();
        self.cache.ingest(&info.world_snapshot(), now);
        self.sync_origin = Some(now);

        let frame = region.frame_mut();
        write_scoring(frame, info, self.cache.vehicle_count());

        let count = self.cache.vehicle_count();
        for (slot, vehicle) in info.vehicles.iter().take(count).enumerate() {
            let pose = PredictedPose::from_state(&self.cache.get(slot));
            frame.vehicles[slot] = build_vehicle(vehicle, &pose);
        }
        for slot in &mut frame.vehicles[count..] {
            *slot = bytemuck::Zeroable::zeroed();
        }
        frame.delta_time = 0.0;

        debug!(
            vehicles = count,
            session = info.session,
            current_et = info.current_et,
            "Published scoring update"
        );
    }

    /// Publish a telemetry update: player fields verbatim, predicted grid poses.
    pub fn on_telemetry(&mut self, info: &TelemetryInfo) {
        let elapsed = self.elapsed_since_scoring();
        let RegionState::Mapped(region) = &mut self.state else {
            return;
        };

        let frame = region.frame_mut();
        write_telemetry(frame, info);

        for (slot, state) in self.cache.iter().enumerate() {
            let pose = self.extrapolator.predict(state, elapsed);
            write_pose(&mut frame.vehicles[slot], &pose);
        }
        frame.delta_time = elapsed as f32;

        trace!(
            elapsed,
            vehicles = self.cache.vehicle_count(),
            extrapolated = self.extrapolator.is_within_window(elapsed),
            "Published telemetry update"
        );
    }

    /// Mirror the host's realtime flag into the frame.
    pub fn set_realtime(&mut self, in_realtime: bool) {
        if let RegionState::Mapped(region) = &mut self.state {
            region.frame_mut().in_realtime = u8::from(in_realtime);
        }
    }
}

fn write_telemetry(frame: &mut SharedFrame, info: &TelemetryInfo) {
    frame.lap_number = info.lap_number;
    frame.lap_start_et = info.lap_start_et;
    write_c_str(&mut frame.vehicle_name, &info.vehicle_name);
    write_c_str(&mut frame.track_name, &info.track_name);

    frame.pos = info.position.into();
    frame.local_vel = info.local_velocity.into();
    frame.local_accel = info.local_acceleration.into();
    frame.ori_x = info.orientation.x.into();
    frame.ori_y = info.orientation.y.into();
    frame.ori_z = info.orientation.z.into();
    frame.local_rot = info.local_rotation.into();
    frame.local_rot_accel = info.local_rotation_accel.into();
    frame.speed = info.speed() as f32;

    frame.gear = info.gear;
    frame.engine_rpm = info.engine_rpm;
    frame.engine_water_temp = info.engine_water_temp;
    frame.engine_oil_temp = info.engine_oil_temp;
    frame.clutch_rpm = info.clutch_rpm;

    frame.unfiltered_throttle = info.unfiltered_throttle;
    frame.unfiltered_brake = info.unfiltered_brake;
    frame.unfiltered_steering = info.unfiltered_steering;
    frame.unfiltered_clutch = info.unfiltered_clutch;
    frame.steering_arm_force = info.steering_arm_force;

    frame.fuel = info.fuel;
    frame.engine_max_rpm = info.engine_max_rpm;
    frame.scheduled_stops = info.scheduled_stops;
    frame.overheating = u8::from(info.overheating);
    frame.detached = u8::from(info.detached);
    frame.dent_severity = info.dent_severity;
    frame.last_impact_et = info.last_impact_et;
    frame.last_impact_magnitude = info.last_impact_magnitude;
    frame.last_impact_pos = info.last_impact_pos.into();

    for (slot, wheel) in info.wheels.iter().enumerate() {
        frame.wheels[slot] = build_wheel(wheel);
    }
}

fn build_wheel(wheel: &WheelTelemetry) -> SharedWheel {
    SharedWheel {
        rotation: wheel.rotation,
        suspension_deflection: wheel.suspension_deflection,
        ride_height: wheel.ride_height,
        tire_load: wheel.tire_load,
        lateral_force: wheel.lateral_force,
        grip_fract: wheel.grip_fract,
        brake_temp: wheel.brake_temp,
        pressure: wheel.pressure,
        temperature: wheel.temperature,
        wear: wheel.wear,
        terrain_name: encode_c_str(&wheel.terrain_name),
        surface_type: wheel.surface_type,
        flat: u8::from(wheel.flat),
        detached: u8::from(wheel.detached),
    }
}

fn write_scoring(frame: &mut SharedFrame, info: &ScoringInfo, tracked: usize) {
    frame.session = info.session;
    frame.current_et = info.current_et;
    frame.end_et = info.end_et;
    frame.max_laps = info.max_laps;
    frame.lap_dist = info.lap_dist;
    frame.num_vehicles = tracked as i32;

    frame.game_phase = info.game_phase;
    frame.yellow_flag_state = info.yellow_flag_state;
    frame.sector_flag = info.sector_flag;
    frame.start_light = info.start_light;
    frame.num_red_lights = info.num_red_lights;
    frame.in_realtime = u8::from(info.in_realtime);
    write_c_str(&mut frame.player_name, &info.player_name);
    write_c_str(&mut frame.plr_file_name, &info.plr_file_name);

    frame.ambient_temp = info.ambient_temp;
    frame.track_temp = info.track_temp;
    frame.wind = info.wind.into();
}

fn build_vehicle(vehicle: &VehicleScoring, pose: &PredictedPose) -> SharedVehicle {
    let mut entry = SharedVehicle {
        driver_name: encode_c_str(&vehicle.driver_name),
        vehicle_name: encode_c_str(&vehicle.vehicle_name),
        total_laps: vehicle.total_laps,
        sector: vehicle.sector,
        finish_status: vehicle.finish_status,
        lap_dist: vehicle.lap_dist,
        path_lateral: vehicle.path_lateral,
        track_edge: vehicle.track_edge,

        best_sector1: vehicle.best_sector1,
        best_sector2: vehicle.best_sector2,
        best_lap_time: vehicle.best_lap_time,
        last_sector1: vehicle.last_sector1,
        last_sector2: vehicle.last_sector2,
        last_lap_time: vehicle.last_lap_time,
        cur_sector1: vehicle.cur_sector1,
        cur_sector2: vehicle.cur_sector2,

        num_pitstops: vehicle.num_pitstops,
        num_penalties: vehicle.num_penalties,
        is_player: u8::from(vehicle.is_player),
        control: vehicle.control,
        in_pits: u8::from(vehicle.in_pits),
        place: vehicle.place,
        vehicle_class: encode_c_str(&vehicle.vehicle_class),

        time_behind_next: vehicle.time_behind_next,
        laps_behind_next: vehicle.laps_behind_next,
        time_behind_leader: vehicle.time_behind_leader,
        laps_behind_leader: vehicle.laps_behind_leader,
        lap_start_et: vehicle.lap_start_et,

        pos: SharedVec3::default(),
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
        speed: 0.0,
    };
    write_pose(&mut entry, pose);
    entry
}

/// Pose fields of one vehicle entry, written back to back.
fn write_pose(entry: &mut SharedVehicle, pose: &PredictedPose) {
    entry.lap_dist = pose.lap_distance as f32;
    entry.pos = pose.position.into();
    entry.yaw = pose.yaw as f32;
    entry.pitch = pose.pitch as f32;
    entry.roll = pose.roll as f32;
    entry.speed = pose.speed as f32;
}
