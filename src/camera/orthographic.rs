//! Orthographic projection.

use crate::math::Matrix4;
use serde::{Deserialize, Serialize};

/// An axis-aligned box mapped linearly into clip space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthographicProjection {
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Top edge.
    pub top: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
}

impl OrthographicProjection {
    /// Projection matrix for this box.
    pub fn matrix(&self) -> Matrix4 {
        Matrix4::orthographic(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }

    /// Cover a drawable in pixel units with y pointing down: `0..width`, `height..0`.
    pub fn fit(&mut self, width: u32, height: u32) {
        self.left = 0.0;
        self.right = width as f32;
        self.bottom = height as f32;
        self.top = 0.0;
    }
}
