//! Three-component vector math in double precision

/// A 3-vector in either world or vehicle-local coordinates.
///
/// The simulator's world frame is left-handed with +y up. In the local vehicle
/// frame +x points out the left side, +y out the roof and +z out the back, so
/// forward travel is along -z.
pub type Vec3 = glam::DVec3;
