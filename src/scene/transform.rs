//! Pivot and Transform components.

use crate::math::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Mutators shared by components that own a local matrix.
///
/// Every mutation is applied in local space: `translate` moves along the
/// already rotated axes, `rotate_*` spins around the current origin.
pub trait LocalTransform {
    /// The local matrix.
    fn local_matrix(&self) -> &Matrix4;

    /// Mutable local matrix.
    fn local_matrix_mut(&mut self) -> &mut Matrix4;

    /// Translation part of the local matrix.
    fn position(&self) -> Vector3 {
        self.local_matrix().translation_part()
    }

    /// Reset to identity.
    fn reset(&mut self) {
        *self.local_matrix_mut() = Matrix4::IDENTITY;
    }

    /// Translate in local space.
    fn translate(&mut self, v: Vector3) {
        let m = self.local_matrix().translated(v);
        *self.local_matrix_mut() = m;
    }

    /// Translate along local x.
    fn translate_x(&mut self, x: f32) {
        self.translate(Vector3::new(x, 0.0, 0.0));
    }

    /// Translate along local y.
    fn translate_y(&mut self, y: f32) {
        self.translate(Vector3::new(0.0, y, 0.0));
    }

    /// Translate along local z.
    fn translate_z(&mut self, z: f32) {
        self.translate(Vector3::new(0.0, 0.0, z));
    }

    /// Rotate around local x by `degrees`.
    fn rotate_x(&mut self, degrees: f32) {
        let m = self.local_matrix().rotated_x(degrees);
        *self.local_matrix_mut() = m;
    }

    /// Rotate around local y by `degrees`.
    fn rotate_y(&mut self, degrees: f32) {
        let m = self.local_matrix().rotated_y(degrees);
        *self.local_matrix_mut() = m;
    }

    /// Rotate around local z by `degrees`.
    fn rotate_z(&mut self, degrees: f32) {
        let m = self.local_matrix().rotated_z(degrees);
        *self.local_matrix_mut() = m;
    }

    /// Scale along local axes.
    fn scale(&mut self, v: Vector3) {
        let m = self.local_matrix().scaled(v);
        *self.local_matrix_mut() = m;
    }

    /// Scale along local x.
    fn scale_x(&mut self, s: f32) {
        self.scale(Vector3::new(s, 1.0, 1.0));
    }

    /// Scale along local y.
    fn scale_y(&mut self, s: f32) {
        self.scale(Vector3::new(1.0, s, 1.0));
    }

    /// Scale along local z.
    fn scale_z(&mut self, s: f32) {
        self.scale(Vector3::new(1.0, 1.0, s));
    }

    /// Keep the position and turn so the local z axis points away from
    /// `target`. Any scale is discarded.
    fn look_at(&mut self, target: Vector3, up: Vector3) {
        let m = Matrix4::look_at(self.position(), target, up);
        *self.local_matrix_mut() = m;
    }
}

/// Local transform applied to the mesh of its node only; children do not
/// inherit it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pivot {
    matrix: Matrix4,
}

impl Pivot {
    /// Identity pivot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pivot with the given local matrix.
    pub fn from_matrix(matrix: Matrix4) -> Self {
        Self { matrix }
    }

    /// The local matrix.
    #[inline]
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }
}

impl LocalTransform for Pivot {
    fn local_matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    fn local_matrix_mut(&mut self) -> &mut Matrix4 {
        &mut self.matrix
    }
}

/// Local transform inherited by child nodes.
///
/// The world matrix is written by [`Scene::update_world_matrices`](super::Scene::update_world_matrices)
/// and is only meaningful after a full pass from the scene root.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    matrix: Matrix4,
    #[serde(skip)]
    world_matrix: Matrix4,
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform with the given local matrix.
    pub fn from_matrix(matrix: Matrix4) -> Self {
        Self {
            matrix,
            world_matrix: Matrix4::IDENTITY,
        }
    }

    /// Transform translated by `v`.
    pub fn from_translation(v: Vector3) -> Self {
        Self::from_matrix(Matrix4::translation(v))
    }

    /// The local matrix.
    #[inline]
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// World matrix from the last update pass.
    #[inline]
    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, world: Matrix4) {
        self.world_matrix = world;
    }
}

impl LocalTransform for Transform {
    fn local_matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    fn local_matrix_mut(&mut self) -> &mut Matrix4 {
        &mut self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_then_rotate_is_local() {
        let mut t = Transform::new();
        t.translate_x(2.0);
        t.rotate_z(90.0);
        t.translate_x(1.0);
        assert!(t.position().approx_eq(&Vector3::new(2.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_reset_and_scale() {
        let mut p = Pivot::new();
        p.scale(Vector3::new(2.0, 3.0, 4.0));
        p.scale_x(0.5);
        let corner = p.matrix().transform_point(Vector3::ONE);
        assert!(corner.approx_eq(&Vector3::new(1.0, 3.0, 4.0), 1e-6));
        p.reset();
        assert_eq!(*p.matrix(), Matrix4::IDENTITY);
    }

    #[test]
    fn test_look_at_keeps_position() {
        let mut t = Transform::from_translation(Vector3::new(0.0, 0.0, 5.0));
        t.look_at(Vector3::ZERO, Vector3::UP);
        assert!(t.position().approx_eq(&Vector3::new(0.0, 0.0, 5.0), 1e-6));
        assert!(t.matrix().axis(2).approx_eq(&Vector3::FORWARD, 1e-6));
    }

    #[test]
    fn test_world_matrix_is_not_serialized() {
        let mut t = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        t.set_world_matrix(Matrix4::translation(Vector3::new(9.0, 9.0, 9.0)));
        let json = serde_json::to_string(&t).unwrap();
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(back.matrix(), t.matrix());
        assert_eq!(*back.world_matrix(), Matrix4::IDENTITY);
    }
}
