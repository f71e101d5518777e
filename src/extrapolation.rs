//! Dead-reckoning of vehicle poses between scoring updates.
//!
//! Scoring arrives at roughly 2 Hz while telemetry runs at hundreds of Hz. In
//! between, every vehicle's pose is predicted from its last authoritative
//! state: the orientation basis is turned through the damped rotation rate,
//! the position advances along the local velocity projected into the world
//! frame, and the lap distance follows the longitudinal (-z) velocity.
//!
//! Prediction is only trusted strictly inside one scoring interval plus slack.
//! For `elapsed <= 0` or `elapsed >= max_elapsed_secs` the last known pose is
//! returned unchanged, so a late or missed scoring update never compounds error.
//!
//! ```rust
//! use rfshared::extrapolation::PoseExtrapolator;
//! use rfshared::types::{OrientationBasis, Vec3, VehicleKinematicState};
//!
//! let state = VehicleKinematicState {
//!     local_velocity: Vec3::new(0.0, 0.0, -20.0),
//!     orientation: OrientationBasis::IDENTITY,
//!     lap_distance: 100.0,
//!     ..VehicleKinematicState::ZERO
//! };
//!
//! let pose = PoseExtrapolator::default().predict(&state, 0.1);
//! assert!((pose.lap_distance - 102.0).abs() < 1e-9);
//! assert!((pose.position.z + 2.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Attitude, OrientationBasis, Vec3, VehicleKinematicState};
use crate::{RelayError, Result};

/// Rotation-rate damping tuned against the simulator's remote-vehicle motion.
/// Full-rate integration over-rotates visibly.
pub const DEFAULT_ROTATION_DAMPING: f64 = 0.05;

/// Velocity damping. Translation is integrated at full rate.
pub const DEFAULT_VELOCITY_DAMPING: f64 = 1.0;

/// Upper bound (exclusive) of the elapsed time that is still extrapolated.
pub const DEFAULT_MAX_ELAPSED_SECS: f64 = 0.55;

/// Tuning of the extrapolator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtrapolationConfig {
    /// Scale applied to the local rotation rate before integrating.
    pub rotation_damping: f64,
    /// Scale applied to the local velocity before integrating.
    pub velocity_damping: f64,
    /// Elapsed times at or above this are not extrapolated (seconds).
    pub max_elapsed_secs: f64,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            rotation_damping: DEFAULT_ROTATION_DAMPING,
            velocity_damping: DEFAULT_VELOCITY_DAMPING,
            max_elapsed_secs: DEFAULT_MAX_ELAPSED_SECS,
        }
    }
}

impl ExtrapolationConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in
            [("rotation_damping", self.rotation_damping), ("velocity_damping", self.velocity_damping)]
        {
            if !value.is_finite() || value < 0.0 {
                return Err(RelayError::config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !self.max_elapsed_secs.is_finite() || self.max_elapsed_secs <= 0.0 {
            return Err(RelayError::config(format!(
                "max_elapsed_secs must be positive, got {}",
                self.max_elapsed_secs
            )));
        }

        Ok(())
    }
}

/// Pose of one vehicle at the current instant, authoritative or predicted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedPose {
    pub position: Vec3,
    pub orientation: OrientationBasis,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub speed: f64,
    pub lap_distance: f64,
}

impl PredictedPose {
    /// Pose of a slot that is not tracked.
    pub const ZERO: PredictedPose = PredictedPose {
        position: Vec3::ZERO,
        orientation: OrientationBasis::ZERO,
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
        speed: 0.0,
        lap_distance: 0.0,
    };

    /// The last known pose of `state`, without any prediction.
    pub fn from_state(state: &VehicleKinematicState) -> Self {
        let Attitude { yaw, pitch, roll } = state.orientation.attitude();
        Self {
            position: state.position,
            orientation: state.orientation,
            yaw,
            pitch,
            roll,
            speed: state.speed(),
            lap_distance: state.lap_distance,
        }
    }
}

/// Predicts vehicle poses from cached kinematic state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseExtrapolator {
    config: ExtrapolationConfig,
}

impl PoseExtrapolator {
    pub fn new(config: ExtrapolationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtrapolationConfig {
        &self.config
    }

    /// Whether `elapsed` seconds since the last scoring update is extrapolated.
    pub fn is_within_window(&self, elapsed: f64) -> bool {
        elapsed > 0.0 && elapsed < self.config.max_elapsed_secs
    }

    /// Predict the pose of `state` after `elapsed` seconds.
    pub fn predict(&self, state: &VehicleKinematicState, elapsed: f64) -> PredictedPose {
        if !self.is_within_window(elapsed) {
            return PredictedPose::from_state(state);
        }

        let basis = state.orientation;
        let rotation_rate = state.local_rotation_rate * self.config.rotation_damping;
        let velocity = state.local_velocity * self.config.velocity_damping;

        let w_rot = basis.to_world(rotation_rate) * elapsed;
        let orientation = basis.rotated(w_rot);
        let Attitude { yaw, pitch, roll } = orientation.attitude();

        PredictedPose {
            position: state.position + basis.to_world(velocity) * elapsed,
            orientation,
            yaw,
            pitch,
            roll,
            speed: velocity.length(),
            lap_distance: state.lap_distance - velocity.z * elapsed,
        }
    }
}
