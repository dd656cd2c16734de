//! Camera component: projection mode and background settings.
//!
//! The camera does not store a view matrix. Its view is the inverse of the
//! world matrix of the node it is attached to, supplied by the viewport.

mod orthographic;
mod perspective;

pub use orthographic::OrthographicProjection;
pub use perspective::CentralProjection;

use crate::math::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Projection parameters applied when a camera is (re)projected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDefaults {
    /// Near plane of central projections.
    pub near: f32,
    /// Far plane of central projections.
    pub far: f32,
    /// Near plane of orthographic projections.
    pub orthographic_near: f32,
    /// Far plane of orthographic projections.
    pub orthographic_far: f32,
    /// Field of view in degrees for new cameras.
    pub field_of_view: f32,
}

impl Default for ProjectionDefaults {
    fn default() -> Self {
        Self {
            near: 1.0,
            far: 2000.0,
            orthographic_near: 400.0,
            orthographic_far: -400.0,
            field_of_view: 45.0,
        }
    }
}

/// The active projection of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Perspective.
    Central(CentralProjection),
    /// Parallel.
    Orthographic(OrthographicProjection),
}

impl Projection {
    /// Projection matrix.
    pub fn matrix(&self) -> Matrix4 {
        match self {
            Projection::Central(p) => p.matrix(),
            Projection::Orthographic(p) => p.matrix(),
        }
    }
}

/// Camera component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    projection: Projection,
    field_of_view: f32,
    defaults: ProjectionDefaults,
    /// Viewports only render through enabled cameras.
    pub enabled: bool,
    /// RGB clear color, components in 0..1.
    pub background_color: Vector3,
    /// Clear with an opaque background; otherwise alpha is 0.
    pub background_enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Perspective camera with default projection parameters.
    pub fn new() -> Self {
        Self::with_defaults(ProjectionDefaults::default())
    }

    /// Perspective camera (aspect 1) using the given parameters.
    pub fn with_defaults(defaults: ProjectionDefaults) -> Self {
        Self {
            projection: Projection::Central(CentralProjection {
                aspect: 1.0,
                fov: defaults.field_of_view,
                near: defaults.near,
                far: defaults.far,
            }),
            field_of_view: defaults.field_of_view,
            defaults,
            enabled: true,
            background_color: Vector3::ZERO,
            background_enabled: true,
        }
    }

    /// Switch to a central projection.
    pub fn project_central(&mut self, aspect: f32, field_of_view: f32) {
        self.field_of_view = field_of_view;
        self.projection = Projection::Central(CentralProjection {
            aspect,
            fov: field_of_view,
            near: self.defaults.near,
            far: self.defaults.far,
        });
    }

    /// Switch to an orthographic projection of the given box.
    pub fn project_orthographic(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Projection::Orthographic(OrthographicProjection {
            left,
            right,
            bottom,
            top,
            near: self.defaults.orthographic_near,
            far: self.defaults.orthographic_far,
        });
    }

    /// Current projection.
    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Whether the camera uses a central projection.
    #[inline]
    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Central(_))
    }

    /// Field of view in degrees, kept across orthographic use.
    #[inline]
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Projection matrix.
    #[inline]
    pub fn projection_matrix(&self) -> Matrix4 {
        self.projection.matrix()
    }

    /// Re-project for a drawable of `width` x `height` pixels.
    pub fn fit(&mut self, width: u32, height: u32) {
        match &mut self.projection {
            Projection::Central(p) => p.fit(width, height),
            Projection::Orthographic(p) => p.fit(width, height),
        }
    }

    /// `projection * inverse(camera_world)`.
    pub fn view_projection(&self, camera_world: &Matrix4) -> Matrix4 {
        self.projection_matrix().multiply(&camera_world.inverse())
    }

    /// RGBA clear color; alpha is 1 only when the background is enabled.
    pub fn clear_color(&self) -> [f32; 4] {
        let alpha = if self.background_enabled { 1.0 } else { 0.0 };
        let c = self.background_color;
        [c.x, c.y, c.z, alpha]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_central() {
        let camera = Camera::new();
        assert!(camera.is_perspective());
        let expected = Matrix4::perspective(1.0, 45.0, 1.0, 2000.0);
        assert!(camera.projection_matrix().approx_eq(&expected, 1e-6));
    }

    #[test]
    fn test_fit_updates_projection() {
        let mut camera = Camera::new();
        camera.fit(800, 400);
        assert_eq!(
            camera.projection(),
            &Projection::Central(CentralProjection { aspect: 2.0, fov: 45.0, near: 1.0, far: 2000.0 })
        );

        camera.project_orthographic(-1.0, 1.0, -1.0, 1.0);
        camera.fit(640, 480);
        let Projection::Orthographic(ortho) = camera.projection() else {
            panic!("expected orthographic projection");
        };
        assert_eq!((ortho.left, ortho.right, ortho.bottom, ortho.top), (0.0, 640.0, 480.0, 0.0));
        assert_eq!((ortho.near, ortho.far), (400.0, -400.0));
        assert_eq!(camera.field_of_view(), 45.0);
    }

    #[test]
    fn test_view_projection_inverts_camera_world() {
        let camera = Camera::new();
        let world = Matrix4::translation(Vector3::new(0.0, 0.0, 10.0));
        let vp = camera.view_projection(&world);
        let expected = camera.projection_matrix().multiply(&Matrix4::translation(Vector3::new(0.0, 0.0, -10.0)));
        assert!(vp.approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_clear_color_alpha() {
        let mut camera = Camera::new();
        camera.background_color = Vector3::new(0.2, 0.4, 0.6);
        assert_eq!(camera.clear_color(), [0.2, 0.4, 0.6, 1.0]);
        camera.background_enabled = false;
        assert_eq!(camera.clear_color()[3], 0.0);
    }
}
