//! Per-vehicle kinematic state and orientation basis

use super::Vec3;
use crate::layout::MAX_VEHICLES;
use glam::DMat3;
use serde::{Deserialize, Serialize};

/// Orientation matrix given as its three rows.
///
/// Each row converts a local vehicle vector into one world component via the
/// dot product, so `to_world(v) = (x·v, y·v, z·v)`. Rows are expected to stay
/// unit length and mutually orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationBasis {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

/// Heading angles derived from an orientation basis, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attitude {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl OrientationBasis {
    pub const IDENTITY: OrientationBasis =
        OrientationBasis { x: Vec3::X, y: Vec3::Y, z: Vec3::Z };

    pub const ZERO: OrientationBasis =
        OrientationBasis { x: Vec3::ZERO, y: Vec3::ZERO, z: Vec3::ZERO };

    pub fn rows(&self) -> [Vec3; 3] {
        [self.x, self.y, self.z]
    }

    /// The basis as a matrix whose rows are `x`, `y` and `z`.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_cols(self.x, self.y, self.z).transpose()
    }

    /// Project a local vehicle vector into world coordinates.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.matrix() * local
    }

    /// Yaw, pitch and roll of this basis.
    pub fn attitude(&self) -> Attitude {
        let (x, y, z) = (self.x, self.y, self.z);
        Attitude {
            yaw: z.x.atan2(z.z),
            pitch: (-y.z).atan2((x.z * x.z + z.z * z.z).sqrt()),
            roll: y.x.atan2((x.x * x.x + z.x * z.x).sqrt()),
        }
    }

    /// Rotate every row through the world-frame angular displacement `w_rot`.
    ///
    /// Rotations are applied about z, then y, then x, and each row is
    /// renormalized afterwards. A row that collapses to zero length is kept
    /// as is.
    pub fn rotated(&self, w_rot: Vec3) -> OrientationBasis {
        let rotation = DMat3::from_rotation_x(w_rot.x)
            * DMat3::from_rotation_y(w_rot.y)
            * DMat3::from_rotation_z(w_rot.z);
        let step = |row: Vec3| {
            let turned = rotation * row;
            turned.normalize_or(turned)
        };
        OrientationBasis { x: step(self.x), y: step(self.y), z: step(self.z) }
    }

    /// Largest deviation from orthonormality across rows (length and pairwise dot).
    pub fn orthonormality_error(&self) -> f64 {
        let [x, y, z] = self.rows();
        [
            (x.length() - 1.0).abs(),
            (y.length() - 1.0).abs(),
            (z.length() - 1.0).abs(),
            x.dot(y).abs(),
            y.dot(z).abs(),
            z.dot(x).abs(),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

impl Default for OrientationBasis {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Last authoritative kinematic state of one vehicle, as delivered by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleKinematicState {
    /// World position in meters.
    pub position: Vec3,
    /// Velocity in local vehicle coordinates (m/s).
    pub local_velocity: Vec3,
    /// Acceleration in local vehicle coordinates (m/s²).
    pub local_acceleration: Vec3,
    /// Rotation rate in local vehicle coordinates (rad/s).
    pub local_rotation_rate: Vec3,
    /// Rotational acceleration in local vehicle coordinates (rad/s²).
    pub local_rotation_accel: Vec3,
    pub orientation: OrientationBasis,
    /// Distance along the track centerline in meters.
    pub lap_distance: f64,
}

impl VehicleKinematicState {
    /// All-zero state, used for untracked slots.
    pub const ZERO: VehicleKinematicState = VehicleKinematicState {
        position: Vec3::ZERO,
        local_velocity: Vec3::ZERO,
        local_acceleration: Vec3::ZERO,
        local_rotation_rate: Vec3::ZERO,
        local_rotation_accel: Vec3::ZERO,
        orientation: OrientationBasis::ZERO,
        lap_distance: 0.0,
    };

    /// Magnitude of the local velocity.
    pub fn speed(&self) -> f64 {
        self.local_velocity.length()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Kinematic view of one scoring update: every tracked vehicle, replaced wholesale.
///
/// Vehicles live in a fixed array of [`MAX_VEHICLES`] slots; slots at or
/// beyond `vehicle_count` stay zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    /// Session clock at the time of the update (seconds).
    pub elapsed_session_time: f64,
    pub session_id: i32,
    vehicle_count: usize,
    vehicles: [VehicleKinematicState; MAX_VEHICLES],
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::new(0, 0.0)
    }
}

impl WorldSnapshot {
    pub const CAPACITY: usize = MAX_VEHICLES;

    pub fn new(session_id: i32, elapsed_session_time: f64) -> Self {
        Self {
            elapsed_session_time,
            session_id,
            vehicle_count: 0,
            vehicles: [VehicleKinematicState::ZERO; MAX_VEHICLES],
        }
    }

    /// Append the next vehicle. Returns `false`, leaving the snapshot
    /// unchanged, once every slot is taken.
    #[must_use]
    pub fn push(&mut self, state: VehicleKinematicState) -> bool {
        let Some(slot) = self.vehicles.get_mut(self.vehicle_count) else {
            return false;
        };
        *slot = state;
        self.vehicle_count += 1;
        true
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    /// Tracked vehicles in slot order.
    pub fn vehicles(&self) -> &[VehicleKinematicState] {
        &self.vehicles[..self.vehicle_count]
    }
}
