//! Central (perspective) projection.

use crate::math::Matrix4;
use serde::{Deserialize, Serialize};

/// Parameters of a central projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralProjection {
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
}

impl CentralProjection {
    /// Projection matrix for these parameters.
    pub fn matrix(&self) -> Matrix4 {
        Matrix4::perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Fit the aspect ratio to a drawable. A zero height keeps the current aspect.
    pub fn fit(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
