//! Core types for the relay.
//!
//! ## Architecture
//!
//! - [`Vec3`] and [`OrientationBasis`] carry the kinematic math in double precision
//! - [`VehicleKinematicState`] is the per-vehicle state cached between scoring updates
//! - [`WorldSnapshot`] is the kinematic projection of one scoring update
//! - [`TelemetryInfo`] and [`ScoringInfo`] mirror the host's callback payloads
//! - Session enums ([`GamePhase`], [`YellowFlagState`], ...) decode raw frame values
//! - [`UpdateRate`] controls how often readers poll the shared region

mod host;
mod kinematics;
mod session;
mod update_rate;
mod vector;

pub use host::{ScoringInfo, TelemetryInfo, VehicleScoring, WheelTelemetry};
pub use kinematics::{Attitude, OrientationBasis, VehicleKinematicState, WorldSnapshot};
pub use session::{
    Control, FinishStatus, GamePhase, Sector, SurfaceType, WheelIndex, YellowFlagState,
};
pub use update_rate::UpdateRate;
pub use vector::Vec3;
