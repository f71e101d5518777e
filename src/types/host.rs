//! Snapshots delivered by the simulator's plugin callbacks.
//!
//! These mirror the host's telemetry and scoring structures field for field.
//! Enumerated values stay raw (as the host delivers them) so they can be copied
//! into the shared frame verbatim; typed views are available through accessors.

use super::{
    GamePhase, OrientationBasis, Vec3, VehicleKinematicState, WorldSnapshot, YellowFlagState,
};
use crate::Result;
use tracing::warn;

/// Per-wheel telemetry of the player vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelTelemetry {
    /// Radians/sec.
    pub rotation: f32,
    /// Meters.
    pub suspension_deflection: f32,
    /// Meters.
    pub ride_height: f32,
    /// Newtons.
    pub tire_load: f32,
    /// Newtons.
    pub lateral_force: f32,
    /// Approximate fraction of the contact patch that is sliding.
    pub grip_fract: f32,
    /// Celsius.
    pub brake_temp: f32,
    /// kPa.
    pub pressure: f32,
    /// Celsius, left/center/right.
    pub temperature: [f32; 3],
    /// Fraction of maximum wear (0.0-1.0).
    pub wear: f32,
    /// Material prefix from the terrain definition.
    pub terrain_name: String,
    /// Raw [`super::SurfaceType`].
    pub surface_type: u8,
    pub flat: bool,
    pub detached: bool,
}

/// High-rate telemetry of the player vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryInfo {
    /// Host frame time (seconds). Not published: the frame carries the time since
    /// the last scoring update instead.
    pub delta_time: f32,
    pub lap_number: i32,
    pub lap_start_et: f32,
    pub vehicle_name: String,
    pub track_name: String,

    pub position: Vec3,
    pub local_velocity: Vec3,
    pub local_acceleration: Vec3,
    pub orientation: OrientationBasis,
    pub local_rotation: Vec3,
    pub local_rotation_accel: Vec3,

    /// -1 reverse, 0 neutral, 1+ forward gears.
    pub gear: i32,
    pub engine_rpm: f32,
    pub engine_water_temp: f32,
    pub engine_oil_temp: f32,
    pub clutch_rpm: f32,

    pub unfiltered_throttle: f32,
    pub unfiltered_brake: f32,
    /// -1.0 (left) to 1.0 (right).
    pub unfiltered_steering: f32,
    pub unfiltered_clutch: f32,
    pub steering_arm_force: f32,

    /// Liters.
    pub fuel: f32,
    pub engine_max_rpm: f32,
    pub scheduled_stops: u8,
    pub overheating: bool,
    pub detached: bool,
    /// 0 none, 1 some, 2 more, at 8 locations around the car.
    pub dent_severity: [u8; 8],
    pub last_impact_et: f32,
    pub last_impact_magnitude: f32,
    pub last_impact_pos: Vec3,

    /// Front left, front right, rear left, rear right.
    pub wheels: [WheelTelemetry; 4],
}

impl TelemetryInfo {
    /// Magnitude of the local velocity (m/s).
    pub fn speed(&self) -> f64 {
        self.local_velocity.length()
    }
}

/// Scoring information for one vehicle on the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleScoring {
    pub driver_name: String,
    pub vehicle_name: String,
    pub total_laps: i16,
    /// Raw [`super::Sector`].
    pub sector: i8,
    /// Raw [`super::FinishStatus`].
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
    pub is_player: bool,
    /// Raw [`super::Control`].
    pub control: i8,
    pub in_pits: bool,
    /// 1-based position.
    pub place: u8,
    pub vehicle_class: String,

    pub time_behind_next: f32,
    pub laps_behind_next: i32,
    pub time_behind_leader: f32,
    pub laps_behind_leader: i32,
    pub lap_start_et: f32,

    pub position: Vec3,
    pub local_velocity: Vec3,
    pub local_acceleration: Vec3,
    pub orientation: OrientationBasis,
    pub local_rotation: Vec3,
    pub local_rotation_accel: Vec3,
}

impl VehicleScoring {
    /// Kinematic part of this vehicle's scoring entry.
    pub fn kinematic_state(&self) -> VehicleKinematicState {
        VehicleKinematicState {
            position: self.position,
            local_velocity: self.local_velocity,
            local_acceleration: self.local_acceleration,
            local_rotation_rate: self.local_rotation,
            local_rotation_accel: self.local_rotation_accel,
            orientation: self.orientation,
            lap_distance: f64::from(self.lap_dist),
        }
    }
}

/// Low-rate scoring snapshot covering the whole grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringInfo {
    pub session: i32,
    pub current_et: f32,
    pub end_et: f32,
    pub max_laps: i32,
    /// Track length in meters.
    pub lap_dist: f32,

    /// Raw [`GamePhase`].
    pub game_phase: u8,
    /// Raw [`YellowFlagState`].
    pub yellow_flag_state: i8,
    pub sector_flag: [i8; 3],
    pub start_light: u8,
    pub num_red_lights: u8,
    pub in_realtime: bool,
    pub player_name: String,
    pub plr_file_name: String,

    /// Celsius.
    pub ambient_temp: f32,
    /// Celsius.
    pub track_temp: f32,
    pub wind: Vec3,

    pub vehicles: Vec<VehicleScoring>,
}

impl ScoringInfo {
    pub fn game_phase(&self) -> Result<GamePhase> {
        GamePhase::try_from(self.game_phase)
    }

    pub fn yellow_flag_state(&self) -> Result<YellowFlagState> {
        YellowFlagState::try_from(self.yellow_flag_state)
    }

    /// Kinematic projection of this scoring update.
    ///
    /// Vehicles beyond [`WorldSnapshot::CAPACITY`] are dropped.
    pub fn world_snapshot(&self) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new(self.session, f64::from(self.current_et));
        for vehicle in &self.vehicles {
            if !snapshot.push(vehicle.kinematic_state()) {
                warn!(
                    reported = self.vehicles.len(),
                    capacity = WorldSnapshot::CAPACITY,
                    "Scoring update exceeds vehicle capacity, extra vehicles dropped"
                );
                break;
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_snapshot_projects_every_vehicle() {
        let scoring = ScoringInfo {
            session: 3,
            current_et: 42.5,
            vehicles: vec![
                VehicleScoring { lap_dist: 10.0, ..Default::default() },
                VehicleScoring {
                    lap_dist: 20.0,
                    local_velocity: Vec3::new(0.0, 0.0, -30.0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let snapshot = scoring.world_snapshot();
        assert_eq!(snapshot.vehicle_count(), 2);
        assert_eq!(snapshot.session_id, 3);
        assert_eq!(snapshot.elapsed_session_time, 42.5);
        assert_eq!(snapshot.vehicles()[1].lap_distance, 20.0);
        assert_eq!(snapshot.vehicles()[1].speed(), 30.0);
    }

    #[test]
    fn oversized_grids_are_truncated() {
        let scoring = ScoringInfo {
            vehicles: (0..200)
                .map(|i| VehicleScoring { lap_dist: i as f32, ..Default::default() })
                .collect(),
            ..Default::default()
        };

        let snapshot = scoring.world_snapshot();
        assert_eq!(snapshot.vehicle_count(), WorldSnapshot::CAPACITY);
        assert_eq!(snapshot.vehicles()[127].lap_distance, 127.0);
    }

    #[test]
    fn typed_accessors_reject_unknown_raw_values() {
        let scoring = ScoringInfo { game_phase: 5, yellow_flag_state: 42, ..Default::default() };
        assert_eq!(scoring.game_phase().unwrap(), GamePhase::GreenFlag);
        assert!(scoring.yellow_flag_state().is_err());
    }
}
