//! 4x4 Matrix implementation.

use super::{deg_to_rad, Vector3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Above this absolute cosine a view direction counts as parallel to the up axis.
const PARALLEL_COSINE: f32 = 1.0 - 1e-6;

/// A 4x4 matrix stored in column-major order.
///
/// Translation lives in elements 12, 13 and 14. Composition follows the usual
/// column-vector convention: `a.multiply(&b)` applies `b` first, then `a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    /// Matrix elements in column-major order.
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Create from a column-major array.
    #[inline]
    pub const fn from_cols_array(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Create the identity matrix.
    #[inline]
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 4 + row]
    }

    /// Translation component.
    #[inline]
    pub fn translation_part(&self) -> Vector3 {
        Vector3::new(self.elements[12], self.elements[13], self.elements[14])
    }

    /// Basis vector of the given column (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis(&self, col: usize) -> Vector3 {
        let base = col * 4;
        Vector3::new(
            self.elements[base],
            self.elements[base + 1],
            self.elements[base + 2],
        )
    }

    // ---- constructors ----------------------------------------------------

    /// Translation matrix.
    pub fn translation(v: Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[12] = v.x;
        m.elements[13] = v.y;
        m.elements[14] = v.z;
        m
    }

    /// Rotation around the x axis, angle in degrees.
    pub fn rotation_x(degrees: f32) -> Self {
        let (s, c) = deg_to_rad(degrees).sin_cos();
        let mut m = Self::IDENTITY;
        m.elements[5] = c;
        m.elements[6] = s;
        m.elements[9] = -s;
        m.elements[10] = c;
        m
    }

    /// Rotation around the y axis, angle in degrees.
    pub fn rotation_y(degrees: f32) -> Self {
        let (s, c) = deg_to_rad(degrees).sin_cos();
        let mut m = Self::IDENTITY;
        m.elements[0] = c;
        m.elements[2] = -s;
        m.elements[8] = s;
        m.elements[10] = c;
        m
    }

    /// Rotation around the z axis, angle in degrees.
    pub fn rotation_z(degrees: f32) -> Self {
        let (s, c) = deg_to_rad(degrees).sin_cos();
        let mut m = Self::IDENTITY;
        m.elements[0] = c;
        m.elements[1] = s;
        m.elements[4] = -s;
        m.elements[5] = c;
        m
    }

    /// Non-uniform scaling matrix.
    pub fn scaling(v: Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[0] = v.x;
        m.elements[5] = v.y;
        m.elements[10] = v.z;
        m
    }

    /// Build a transform placed at `position` whose local z axis points away
    /// from `target`.
    ///
    /// This is an object (camera) matrix, not a view matrix; invert it to get
    /// the view. When the view direction is parallel to `up`, the least
    /// aligned world axis is used as the reference instead so the basis stays
    /// orthonormal. If `position == target` the rotation is left as identity.
    pub fn look_at(position: Vector3, target: Vector3, up: Vector3) -> Self {
        let z = (position - target).normalized();
        if z == Vector3::ZERO {
            return Self::translation(position);
        }

        let mut reference = up.normalized();
        if reference == Vector3::ZERO || z.dot(&reference).abs() > PARALLEL_COSINE {
            reference = least_aligned_axis(z);
        }

        let x = reference.cross(&z).normalized();
        let y = z.cross(&x);

        Self {
            elements: [
                x.x, x.y, x.z, 0.0,
                y.x, y.y, y.z, 0.0,
                z.x, z.y, z.z, 0.0,
                position.x, position.y, position.z, 1.0,
            ],
        }
    }

    /// Central (perspective) projection.
    ///
    /// `fov_degrees` is the vertical field of view. Right handed, the camera
    /// looks down -z and depth lands in the 0..1 range used by wgpu.
    pub fn perspective(aspect: f32, fov_degrees: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (deg_to_rad(fov_degrees) * 0.5).tan();
        let range_inv = 1.0 / (near - far);

        Self {
            elements: [
                f / aspect, 0.0, 0.0, 0.0,
                0.0, f, 0.0, 0.0,
                0.0, 0.0, far * range_inv, -1.0,
                0.0, 0.0, near * far * range_inv, 0.0,
            ],
        }
    }

    /// Orthographic projection of the given box into clip space (depth 0..1).
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let fn_ = 1.0 / (far - near);

        Self {
            elements: [
                2.0 * rl, 0.0, 0.0, 0.0,
                0.0, 2.0 * tb, 0.0, 0.0,
                0.0, 0.0, -fn_, 0.0,
                -(right + left) * rl, -(top + bottom) * tb, -near * fn_, 1.0,
            ],
        }
    }

    // ---- composition -----------------------------------------------------

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix4) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Self { elements: out }
    }

    /// `self` followed by a translation in local space.
    pub fn translated(&self, v: Vector3) -> Self {
        self.multiply(&Self::translation(v))
    }

    /// `self` followed by a local x rotation (degrees).
    pub fn rotated_x(&self, degrees: f32) -> Self {
        self.multiply(&Self::rotation_x(degrees))
    }

    /// `self` followed by a local y rotation (degrees).
    pub fn rotated_y(&self, degrees: f32) -> Self {
        self.multiply(&Self::rotation_y(degrees))
    }

    /// `self` followed by a local z rotation (degrees).
    pub fn rotated_z(&self, degrees: f32) -> Self {
        self.multiply(&Self::rotation_z(degrees))
    }

    /// `self` followed by a local scale.
    pub fn scaled(&self, v: Vector3) -> Self {
        self.multiply(&Self::scaling(v))
    }

    /// Determinant.
    pub fn determinant(&self) -> f32 {
        let f = SubFactors::of(self);
        f.determinant()
    }

    /// Inverse matrix.
    ///
    /// Singular input is not checked; the result then contains non-finite
    /// values.
    pub fn inverse(&self) -> Self {
        let e = &self.elements;
        let f = SubFactors::of(self);
        let inv_det = 1.0 / f.determinant();

        let out = [
            e[5] * f.b11 - e[6] * f.b10 + e[7] * f.b09,
            e[2] * f.b10 - e[1] * f.b11 - e[3] * f.b09,
            e[13] * f.b05 - e[14] * f.b04 + e[15] * f.b03,
            e[10] * f.b04 - e[9] * f.b05 - e[11] * f.b03,
            e[6] * f.b08 - e[4] * f.b11 - e[7] * f.b07,
            e[0] * f.b11 - e[2] * f.b08 + e[3] * f.b07,
            e[14] * f.b02 - e[12] * f.b05 - e[15] * f.b01,
            e[8] * f.b05 - e[10] * f.b02 + e[11] * f.b01,
            e[4] * f.b10 - e[5] * f.b08 + e[7] * f.b06,
            e[1] * f.b08 - e[0] * f.b10 - e[3] * f.b06,
            e[12] * f.b04 - e[13] * f.b02 + e[15] * f.b00,
            e[9] * f.b02 - e[8] * f.b04 - e[11] * f.b00,
            e[5] * f.b07 - e[4] * f.b09 - e[6] * f.b06,
            e[0] * f.b09 - e[1] * f.b07 + e[2] * f.b06,
            e[13] * f.b01 - e[12] * f.b03 - e[14] * f.b00,
            e[8] * f.b03 - e[9] * f.b01 + e[10] * f.b00,
        ];

        Self { elements: out.map(|v| v * inv_det) }
    }

    /// Transform a point (w = 1), dividing by the resulting w.
    pub fn transform_point(&self, v: Vector3) -> Vector3 {
        let e = &self.elements;
        let w = e[3] * v.x + e[7] * v.y + e[11] * v.z + e[15];
        Vector3::new(
            e[0] * v.x + e[4] * v.y + e[8] * v.z + e[12],
            e[1] * v.x + e[5] * v.y + e[9] * v.z + e[13],
            e[2] * v.x + e[6] * v.y + e[10] * v.z + e[14],
        ) / w
    }

    /// Check if approximately equal to another matrix.
    pub fn approx_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }

    /// Columns as nested arrays, the layout WGSL expects for `mat4x4<f32>`.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let e = &self.elements;
        [
            [e[0], e[1], e[2], e[3]],
            [e[4], e[5], e[6], e[7]],
            [e[8], e[9], e[10], e[11]],
            [e[12], e[13], e[14], e[15]],
        ]
    }
}

/// 2x2 sub-determinants shared by [`Matrix4::determinant`] and [`Matrix4::inverse`].
struct SubFactors {
    b00: f32,
    b01: f32,
    b02: f32,
    b03: f32,
    b04: f32,
    b05: f32,
    b06: f32,
    b07: f32,
    b08: f32,
    b09: f32,
    b10: f32,
    b11: f32,
}

impl SubFactors {
    fn of(m: &Matrix4) -> Self {
        let e = &m.elements;
        Self {
            b00: e[0] * e[5] - e[1] * e[4],
            b01: e[0] * e[6] - e[2] * e[4],
            b02: e[0] * e[7] - e[3] * e[4],
            b03: e[1] * e[6] - e[2] * e[5],
            b04: e[1] * e[7] - e[3] * e[5],
            b05: e[2] * e[7] - e[3] * e[6],
            b06: e[8] * e[13] - e[9] * e[12],
            b07: e[8] * e[14] - e[10] * e[12],
            b08: e[8] * e[15] - e[11] * e[12],
            b09: e[9] * e[14] - e[10] * e[13],
            b10: e[9] * e[15] - e[11] * e[13],
            b11: e[10] * e[15] - e[11] * e[14],
        }
    }

    fn determinant(&self) -> f32 {
        self.b00 * self.b11 - self.b01 * self.b10 + self.b02 * self.b09 + self.b03 * self.b08
            - self.b04 * self.b07
            + self.b05 * self.b06
    }
}

fn least_aligned_axis(v: Vector3) -> Vector3 {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax <= ay && ax <= az {
        Vector3::RIGHT
    } else if ay <= az {
        Vector3::UP
    } else {
        Vector3::FORWARD
    }
}

impl std::ops::Mul for Matrix4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self { elements: m.to_cols_array() }
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Matrix4> {
        vec![
            Matrix4::translation(Vector3::new(1.0, -2.0, 3.5)).rotated_y(30.0),
            Matrix4::rotation_x(-45.0).scaled(Vector3::new(2.0, 0.5, 1.5)),
            Matrix4::rotation_z(90.0).translated(Vector3::new(0.0, 4.0, -1.0)),
            Matrix4::perspective(1.5, 45.0, 1.0, 2000.0),
            Matrix4::look_at(Vector3::new(3.0, 2.0, 5.0), Vector3::ZERO, Vector3::UP),
        ]
    }

    #[test]
    fn test_identity() {
        for a in samples() {
            assert!(a.multiply(&Matrix4::identity()).approx_eq(&a, 1e-6));
            assert!(Matrix4::identity().multiply(&a).approx_eq(&a, 1e-6));
        }
    }

    #[test]
    fn test_multiply_associative() {
        let m = samples();
        for a in &m {
            for b in &m {
                for c in &m {
                    let left = a.multiply(b).multiply(c);
                    let right = a.multiply(&b.multiply(c));
                    let scale = left.elements.iter().fold(1.0f32, |s, v| s.max(v.abs()));
                    assert!(left.approx_eq(&right, 1e-5 * scale));
                }
            }
        }
    }

    #[test]
    fn test_multiply_matches_glam() {
        let m = samples();
        let expected = glam::Mat4::from(m[0]) * glam::Mat4::from(m[1]);
        assert!(m[0].multiply(&m[1]).approx_eq(&Matrix4::from(expected), 1e-5));
    }

    #[test]
    fn test_inverse() {
        for a in samples() {
            let product = a.multiply(&a.inverse());
            assert!(product.inverse().approx_eq(&Matrix4::identity(), 1e-4));

            let oracle = Matrix4::from(glam::Mat4::from(a).inverse());
            assert!(a.inverse().approx_eq(&oracle, 1e-4));
        }
    }

    #[test]
    fn test_determinant() {
        let m = Matrix4::scaling(Vector3::new(2.0, 3.0, 4.0)).rotated_z(37.0);
        assert!((m.determinant() - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_translation() {
        let m = Matrix4::translation(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(&m.elements[12..15], &[1.0, 2.0, 3.0]);
        let p = m.transform_point(Vector3::ZERO);
        assert!(p.approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_rotation_degrees() {
        let p = Matrix4::rotation_z(90.0).transform_point(Vector3::RIGHT);
        assert!(p.approx_eq(&Vector3::UP, 1e-6));
        let p = Matrix4::rotation_x(90.0).transform_point(Vector3::UP);
        assert!(p.approx_eq(&Vector3::FORWARD, 1e-6));
        let p = Matrix4::rotation_y(90.0).transform_point(Vector3::FORWARD);
        assert!(p.approx_eq(&Vector3::RIGHT, 1e-6));
    }

    fn assert_orthonormal(m: &Matrix4) {
        let (x, y, z) = (m.axis(0), m.axis(1), m.axis(2));
        for v in [x, y, z] {
            assert!((v.length() - 1.0).abs() < 1e-4, "axis not unit: {v:?}");
        }
        assert!(x.dot(&y).abs() < 1e-4);
        assert!(y.dot(&z).abs() < 1e-4);
        assert!(z.dot(&x).abs() < 1e-4);
        assert!(x.cross(&y).approx_eq(&z, 1e-4));
    }

    #[test]
    fn test_look_at_basis_orthonormal() {
        let position = Vector3::new(0.0, 0.0, 0.0);
        let targets = [
            Vector3::new(0.0, 5.0, 0.0),
            Vector3::new(0.0, -3.0, 0.0),
            Vector3::new(1e-7, 10.0, 0.0),
            Vector3::new(4.0, 1.0, -2.0),
            Vector3::new(0.0, 0.0, -1.0),
        ];
        for target in targets {
            let m = Matrix4::look_at(position, target, Vector3::UP);
            assert_orthonormal(&m);
            let z = m.axis(2);
            assert!(z.approx_eq(&(position - target).normalized(), 1e-4));
        }
    }

    #[test]
    fn test_look_at_translation() {
        let eye = Vector3::new(0.0, 0.0, 10.0);
        let m = Matrix4::look_at(eye, Vector3::ZERO, Vector3::UP);
        assert!(m.translation_part().approx_eq(&eye, 1e-6));
        assert!(m.approx_eq(&Matrix4::translation(eye), 1e-6));
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = Matrix4::perspective(1.0, 90.0, 1.0, 100.0);
        let near = p.transform_point(Vector3::new(0.0, 0.0, -1.0));
        let far = p.transform_point(Vector3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
        let oracle = glam::Mat4::perspective_rh(90f32.to_radians(), 1.0, 1.0, 100.0);
        assert!(p.approx_eq(&Matrix4::from(oracle), 1e-5));
    }

    #[test]
    fn test_orthographic_maps_box() {
        let o = Matrix4::orthographic(0.0, 800.0, 600.0, 0.0, 400.0, -400.0);
        let corner = o.transform_point(Vector3::new(0.0, 600.0, 0.0));
        assert!(corner.approx_eq(&Vector3::new(-1.0, -1.0, 0.5), 1e-5));
        let corner = o.transform_point(Vector3::new(800.0, 0.0, 0.0));
        assert!(corner.approx_eq(&Vector3::new(1.0, 1.0, 0.5), 1e-5));
    }
}
