//! Three-component vector.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Vectors shorter than this normalize to [`Vector3::ZERO`].
pub const NORMALIZE_THRESHOLD: f32 = 1e-5;

/// A 3D vector with x, y, and z components.
///
/// Operations return new values; the vector is treated as immutable by
/// convention even though its fields are public.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Vector3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vector3 {
    /// (0, 0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    /// (1, 1, 1).
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };
    /// +Y.
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    /// +Z, towards a default camera.
    pub const FORWARD: Self = Self { x: 0.0, y: 0.0, z: 1.0 };
    /// +X.
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0, z: 0.0 };

    /// Vector from components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// All components equal to `v`.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Vector from `[x, y, z]`.
    #[inline]
    pub const fn from_array(a: [f32; 3]) -> Self {
        Self { x: a[0], y: a[1], z: a[2] }
    }

    /// `[x, y, z]`.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Sum up any number of vectors.
    pub fn sum<'a>(vectors: impl IntoIterator<Item = &'a Vector3>) -> Self {
        vectors.into_iter().fold(Self::ZERO, |acc, v| acc + *v)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Return a unit-length copy of the vector.
    ///
    /// Vectors with a length at or below [`NORMALIZE_THRESHOLD`] yield the zero
    /// vector instead of dividing by (almost) zero.
    #[inline]
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > NORMALIZE_THRESHOLD {
            *self / len
        } else {
            Self::ZERO
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product.
    #[inline]
    pub fn cross(&self, other: &Vector3) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Component-wise comparison within `epsilon`.
    #[inline]
    pub fn approx_eq(&self, other: &Vector3, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

macro_rules! componentwise {
    ($trait:ident, $method:ident, $assign:ident, $assign_method:ident, $op:tt, $rhs:ty, $($other:tt)+) => {
        impl $trait<$rhs> for Vector3 {
            type Output = Self;
            #[inline]
            fn $method(self, rhs: $rhs) -> Self {
                let other = $($other)+;
                Self::new(self.x $op other(rhs, 0), self.y $op other(rhs, 1), self.z $op other(rhs, 2))
            }
        }

        impl $assign<$rhs> for Vector3 {
            #[inline]
            fn $assign_method(&mut self, rhs: $rhs) {
                *self = (*self).$method(rhs);
            }
        }
    };
}

componentwise!(Add, add, AddAssign, add_assign, +, Vector3, |v: Vector3, i: usize| v.to_array()[i]);
componentwise!(Sub, sub, SubAssign, sub_assign, -, Vector3, |v: Vector3, i: usize| v.to_array()[i]);
componentwise!(Mul, mul, MulAssign, mul_assign, *, f32, |s: f32, _: usize| s);
componentwise!(Div, div, DivAssign, div_assign, /, f32, |s: f32, _: usize| s);

impl Neg for Vector3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self * -1.0
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(a: [f32; 3]) -> Self {
        Self::from_array(a)
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

impl From<glam::Vec3> for Vector3 {
    fn from(v: glam::Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vector3> for glam::Vec3 {
    fn from(v: Vector3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}
