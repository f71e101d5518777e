//! Host snapshot fixtures shared by unit tests and benchmarks
//!
//! The fixtures are deterministic: the same arguments always produce the same
//! snapshot, so tests can compare published frames byte for byte.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::{
    GamePhase, OrientationBasis, ScoringInfo, TelemetryInfo, Vec3, VehicleScoring,
    WheelTelemetry, YellowFlagState,
};

/// Track length used by the fixtures (meters).
pub const TRACK_LENGTH: f32 = 4_012.5;

/// Scoring entry of the vehicle in grid slot `slot`.
///
/// Vehicles are spread along the track, drive forward (-z) at `20 + slot` m/s
/// and yaw slowly. Slot 0 is the player.
pub fn grid_vehicle(slot: usize) -> VehicleScoring {
    let offset = slot as f64;
    VehicleScoring {
        driver_name: format!("Driver {}", slot + 1),
        vehicle_name: format!("Car #{}", slot + 10),
        total_laps: 3,
        sector: 1,
        finish_status: 0,
        lap_dist: 100.0 + 25.0 * slot as f32,
        path_lateral: 0.5,
        track_edge: 6.0,

        best_sector1: 31.2,
        best_sector2: 62.9,
        best_lap_time: 95.4 + slot as f32 * 0.1,
        last_sector1: 31.5,
        last_sector2: 63.1,
        last_lap_time: 96.0,
        cur_sector1: 31.8,
        cur_sector2: -1.0,

        num_pitstops: 0,
        num_penalties: 0,
        is_player: slot == 0,
        control: if slot == 0 { 0 } else { 1 },
        in_pits: false,
        place: (slot + 1).min(u8::MAX as usize) as u8,
        vehicle_class: "GT".to_string(),

        time_behind_next: if slot == 0 { 0.0 } else { 0.8 },
        laps_behind_next: 0,
        time_behind_leader: 0.8 * slot as f32,
        laps_behind_leader: 0,
        lap_start_et: 24.6,

        position: Vec3::new(5.0 * offset, 0.2, -25.0 * offset),
        local_velocity: Vec3::new(0.0, 0.0, -(20.0 + offset)),
        local_acceleration: Vec3::new(0.0, 0.0, -1.5),
        orientation: OrientationBasis::IDENTITY,
        local_rotation: Vec3::new(0.0, 0.2, 0.0),
        local_rotation_accel: Vec3::ZERO,
    }
}

/// Scoring update with `vehicles` vehicles on the grid.
pub fn grid_scoring(vehicles: usize) -> ScoringInfo {
    ScoringInfo {
        session: 10,
        current_et: 120.5,
        end_et: 1_800.0,
        max_laps: 20,
        lap_dist: TRACK_LENGTH,

        game_phase: GamePhase::GreenFlag.raw(),
        yellow_flag_state: YellowFlagState::NoFlag.raw(),
        sector_flag: [0, 0, 0],
        start_light: 0,
        num_red_lights: 5,
        in_realtime: true,
        player_name: "Test Driver".to_string(),
        plr_file_name: "TestDriver".to_string(),

        ambient_temp: 21.0,
        track_temp: 29.5,
        wind: Vec3::new(1.0, 0.0, 0.5),

        vehicles: (0..vehicles).map(grid_vehicle).collect(),
    }
}

/// Player telemetry in fourth gear on a straight.
pub fn player_telemetry() -> TelemetryInfo {
    let wheel = |wear: f32| WheelTelemetry {
        rotation: 95.0,
        suspension_deflection: 0.04,
        ride_height: 0.06,
        tire_load: 3_900.0,
        lateral_force: -120.0,
        grip_fract: 0.1,
        brake_temp: 420.0,
        pressure: 165.0,
        temperature: [361.0, 365.0, 362.0],
        wear,
        terrain_name: "ROAD".to_string(),
        surface_type: 0,
        flat: false,
        detached: false,
    };

    TelemetryInfo {
        delta_time: 0.01,
        lap_number: 4,
        lap_start_et: 24.6,
        vehicle_name: "Car #10".to_string(),
        track_name: "Mills Metropark".to_string(),

        position: Vec3::new(0.0, 0.2, 0.0),
        local_velocity: Vec3::new(0.3, 0.0, -42.0),
        local_acceleration: Vec3::new(0.0, 0.0, -2.0),
        orientation: OrientationBasis::IDENTITY,
        local_rotation: Vec3::new(0.0, 0.01, 0.0),
        local_rotation_accel: Vec3::ZERO,

        gear: 4,
        engine_rpm: 7_250.0,
        engine_water_temp: 88.0,
        engine_oil_temp: 102.0,
        clutch_rpm: 7_240.0,

        unfiltered_throttle: 1.0,
        unfiltered_brake: 0.0,
        unfiltered_steering: -0.05,
        unfiltered_clutch: 0.0,
        steering_arm_force: 310.0,

        fuel: 38.5,
        engine_max_rpm: 8_500.0,
        scheduled_stops: 1,
        overheating: false,
        detached: false,
        dent_severity: [0, 0, 1, 0, 0, 0, 0, 2],
        last_impact_et: 88.1,
        last_impact_magnitude: 450.0,
        last_impact_pos: Vec3::new(-0.8, 0.3, 1.9),

        wheels: [wheel(0.98), wheel(0.97), wheel(0.95), wheel(0.94)],
    }
}

/// Assert that two floats differ by at most `epsilon`.
#[track_caller]
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() <= epsilon,
        "expected {expected}, got {actual} (epsilon {epsilon})"
    );
}
