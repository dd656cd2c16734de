//! # Math Module
//!
//! The small linear-algebra core under every transform in the scene graph:
//! a 3-component vector and a column-major 4x4 matrix. All angles taken by
//! the public API are degrees.
//!
//! `glam` conversions are provided for interop; the engine itself only uses
//! these types.

mod matrix4;
mod vector3;

pub use matrix4::Matrix4;
pub use vector3::{Vector3, NORMALIZE_THRESHOLD};

/// Common math constants.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = PI / 180.0;
    /// Radians to degrees conversion factor.
    pub const RAD2DEG: f32 = 180.0 / PI;
    /// Small epsilon for floating point comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * consts::DEG2RAD
}

/// Convert radians to degrees.
#[inline]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * consts::RAD2DEG
}
