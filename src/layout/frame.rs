//! Packed structures of the shared frame.
//!
//! Every struct here is `#[repr(C, packed)]`: no padding, byte-exact field
//! order, shared with every reader of the region. Booleans are stored as a
//! single byte (0 or 1) and C `long` fields as `i32`.
//!
//! Because of the packing, fields must be read and written by value. Taking a
//! reference to a multi-byte field does not compile; copy it out first.

use bytemuck::{Pod, Zeroable};

use super::text::read_c_str;
use crate::types::Vec3;
use crate::{RelayError, Result};

/// Maximum number of vehicles in the frame.
pub const MAX_VEHICLES: usize = 128;

/// Size in bytes of [`SharedWheel`].
pub const SHARED_WHEEL_SIZE: usize = 67;

/// Size in bytes of [`SharedVehicle`].
pub const SHARED_VEHICLE_SIZE: usize = 232;

/// Size in bytes of [`SharedFrame`], and of the shared region.
pub const SHARED_FRAME_SIZE: usize = 735 + MAX_VEHICLES * SHARED_VEHICLE_SIZE;

const _: () = assert!(std::mem::size_of::<SharedVec3>() == 12);
const _: () = assert!(std::mem::size_of::<SharedWheel>() == SHARED_WHEEL_SIZE);
const _: () = assert!(std::mem::size_of::<SharedVehicle>() == SHARED_VEHICLE_SIZE);
const _: () = assert!(std::mem::size_of::<SharedFrame>() == SHARED_FRAME_SIZE);

/// Single-precision vector as stored in the frame.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
pub struct SharedVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for SharedVec3 {
    fn from(v: Vec3) -> Self {
        SharedVec3 { x: v.x as f32, y: v.y as f32, z: v.z as f32 }
    }
}

impl From<SharedVec3> for Vec3 {
    fn from(v: SharedVec3) -> Self {
        let SharedVec3 { x, y, z } = v;
        Vec3::new(f64::from(x), f64::from(y), f64::from(z))
    }
}

/// Per-wheel block of the player telemetry.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct SharedWheel {
    pub rotation: f32,
    pub suspension_deflection: f32,
    pub ride_height: f32,
    pub tire_load: f32,
    pub lateral_force: f32,
    pub grip_fract: f32,
    pub brake_temp: f32,
    pub pressure: f32,
    pub temperature: [f32; 3],
    pub wear: f32,
    pub terrain_name: [u8; 16],
    pub surface_type: u8,
    pub flat: u8,
    pub detached: u8,
}

/// Scoring entry and pose of one vehicle.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct SharedVehicle {
    pub driver_name: [u8; 32],
    pub vehicle_name: [u8; 64],
    pub total_laps: i16,
    pub sector: i8,
    pub finish_status: i8,
    pub lap_dist: f32,
    pub path_lateral: f32,
    pub track_edge: f32,

    pub best_sector1: f32,
    pub best_sector2: f32,
    pub best_lap_time: f32,
    pub last_sector1: f32,
    pub last_sector2: f32,
    pub last_lap_time: f32,
    pub cur_sector1: f32,
    pub cur_sector2: f32,

    pub num_pitstops: i16,
    pub num_penalties: i16,
    pub is_player: u8,
    pub control: i8,
    pub in_pits: u8,
    pub place: u8,
    pub vehicle_class: [u8; 32],

    pub time_behind_next: f32,
    pub laps_behind_next: i32,
    pub time_behind_leader: f32,
    pub laps_behind_leader: i32,
    pub lap_start_et: f32,

    pub pos: SharedVec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub speed: f32,
}

impl SharedVehicle {
    pub fn driver_name(&self) -> String {
        read_c_str(&self.driver_name).into_owned()
    }

    pub fn vehicle_name(&self) -> String {
        read_c_str(&self.vehicle_name).into_owned()
    }

    pub fn vehicle_class(&self) -> String {
        read_c_str(&self.vehicle_class).into_owned()
    }

    pub fn is_player(&self) -> bool {
        self.is_player != 0
    }

    pub fn in_pits(&self) -> bool {
        self.in_pits != 0
    }

    pub fn position(&self) -> Vec3 {
        self.pos.into()
    }
}

/// The complete frame written to the shared region.
#[repr(C, packed)]
#[derive(Clone, Copy, Zeroable, Pod)]
pub struct SharedFrame {
    // Time
    pub delta_time: f32,
    pub lap_number: i32,
    pub lap_start_et: f32,
    pub vehicle_name: [u8; 64],
    pub track_name: [u8; 64],

    // Position and derivatives
    pub pos: SharedVec3,
    pub local_vel: SharedVec3,
    pub local_accel: SharedVec3,

    // Orientation and derivatives
    pub ori_x: SharedVec3,
    pub ori_y: SharedVec3,
    pub ori_z: SharedVec3,
    pub local_rot: SharedVec3,
    pub local_rot_accel: SharedVec3,

    pub speed: f32,

    // Vehicle status
    pub gear: i32,
    pub engine_rpm: f32,
    pub engine_water_temp: f32,
    pub engine_oil_temp: f32,
    pub clutch_rpm: f32,

    // Driver input
    pub unfiltered_throttle: f32,
    pub unfiltered_brake: f32,
    pub unfiltered_steering: f32,
    pub unfiltered_clutch: f32,
    pub steering_arm_force: f32,

    // State and damage
    pub fuel: f32,
    pub engine_max_rpm: f32,
    pub scheduled_stops: u8,
    pub overheating: u8,
    pub detached: u8,
    pub dent_severity: [u8; 8],
    pub last_impact_et: f32,
    pub last_impact_magnitude: f32,
    pub last_impact_pos: SharedVec3,

    pub wheels: [SharedWheel; 4],

    // Scoring
    pub session: i32,
    pub current_et: f32,
    pub end_et: f32,
    pub max_laps: i32,
    pub lap_dist: f32,
    pub num_vehicles: i32,
    pub game_phase: u8,
    pub yellow_flag_state: i8,
    pub sector_flag: [i8; 3],
    pub start_light: u8,
    pub num_red_lights: u8,
    pub in_realtime: u8,
    pub player_name: [u8; 32],
    pub plr_file_name: [u8; 64],

    // Weather
    pub ambient_temp: f32,
    pub track_temp: f32,
    pub wind: SharedVec3,

    pub vehicles: [SharedVehicle; MAX_VEHICLES],
}

impl SharedFrame {
    /// All-zero frame, the state of a freshly created region.
    pub fn zeroed() -> Self {
        <Self as Zeroable>::zeroed()
    }

    /// Heap-allocated all-zero frame.
    pub fn boxed_zeroed() -> Box<Self> {
        bytemuck::zeroed_box()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Copy a frame out of a raw byte buffer of exactly [`SHARED_FRAME_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bytemuck::try_pod_read_unaligned(bytes)
            .map_err(|_| RelayError::Layout { expected: SHARED_FRAME_SIZE, found: bytes.len() })
    }

    pub fn is_zeroed(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }

    /// Vehicles covered by the last scoring update, clamped to capacity.
    pub fn active_vehicles(&self) -> &[SharedVehicle] {
        let count = self.num_vehicles.clamp(0, MAX_VEHICLES as i32) as usize;
        &self.vehicles[..count]
    }

    pub fn vehicle_name(&self) -> String {
        read_c_str(&self.vehicle_name).into_owned()
    }

    pub fn track_name(&self) -> String {
        read_c_str(&self.track_name).into_owned()
    }

    pub fn player_name(&self) -> String {
        read_c_str(&self.player_name).into_owned()
    }

    pub fn plr_file_name(&self) -> String {
        read_c_str(&self.plr_file_name).into_owned()
    }

    pub fn in_realtime(&self) -> bool {
        self.in_realtime != 0
    }
}

impl Default for SharedFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl PartialEq for SharedFrame {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl std::fmt::Debug for SharedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let delta_time = self.delta_time;
        let session = self.session;
        let current_et = self.current_et;
        let num_vehicles = self.num_vehicles;
        f.debug_struct("SharedFrame")
            .field("delta_time", &delta_time)
            .field("session", &session)
            .field("current_et", &current_et)
            .field("num_vehicles", &num_vehicles)
            .field("track_name", &self.track_name())
            .field("vehicle_name", &self.vehicle_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn frame_layout_is_packed() {
        assert_eq!(std::mem::align_of::<SharedFrame>(), 1);
        assert_eq!(std::mem::size_of::<SharedFrame>(), 30_431);
        assert_eq!(SHARED_FRAME_SIZE, 30_431);
    }

    #[test]
    fn field_offsets_match_reader_layout() {
        assert_eq!(offset_of!(SharedFrame, vehicle_name), 12);
        assert_eq!(offset_of!(SharedFrame, pos), 140);
        assert_eq!(offset_of!(SharedFrame, speed), 236);
        assert_eq!(offset_of!(SharedFrame, gear), 240);
        assert_eq!(offset_of!(SharedFrame, fuel), 280);
        assert_eq!(offset_of!(SharedFrame, dent_severity), 291);
        assert_eq!(offset_of!(SharedFrame, wheels), 319);
        assert_eq!(offset_of!(SharedFrame, session), 587);
        assert_eq!(offset_of!(SharedFrame, num_vehicles), 607);
        assert_eq!(offset_of!(SharedFrame, in_realtime), 618);
        assert_eq!(offset_of!(SharedFrame, wind), 723);
        assert_eq!(offset_of!(SharedFrame, vehicles), 735);

        assert_eq!(offset_of!(SharedVehicle, lap_dist), 100);
        assert_eq!(offset_of!(SharedVehicle, vehicle_class), 152);
        assert_eq!(offset_of!(SharedVehicle, pos), 204);
        assert_eq!(offset_of!(SharedVehicle, yaw), 216);
        assert_eq!(offset_of!(SharedVehicle, speed), 228);

        assert_eq!(offset_of!(SharedWheel, terrain_name), 48);
        assert_eq!(offset_of!(SharedWheel, detached), 66);
    }

    #[test]
    fn zeroed_frame_round_trips_through_bytes() {
        let frame = SharedFrame::boxed_zeroed();
        assert!(frame.is_zeroed());
        let copy = SharedFrame::from_bytes(frame.as_bytes()).unwrap();
        assert_eq!(copy, *frame);
    }

    #[test]
    fn wrong_sized_buffers_are_layout_errors() {
        let err = SharedFrame::from_bytes(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, RelayError::Layout { expected: SHARED_FRAME_SIZE, found: 16 }));
    }

    #[test]
    fn active_vehicles_are_clamped() {
        let mut frame = SharedFrame::boxed_zeroed();
        frame.num_vehicles = 3;
        assert_eq!(frame.active_vehicles().len(), 3);
        frame.num_vehicles = -4;
        assert!(frame.active_vehicles().is_empty());
        frame.num_vehicles = 1_000;
        assert_eq!(frame.active_vehicles().len(), MAX_VEHICLES);
    }
}
