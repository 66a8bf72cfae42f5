//! Common types used across osgjs
//!
//! Vector, quaternion and matrix types follow the OpenSceneGraph conventions:
//! points are row vectors (`p' = p * M`) and a matrix stores its translation
//! in the last row, so flattening row by row puts it at elements 12..14.

use serde::{Deserialize, Serialize};

/// Stable identity token for shared scene objects
///
/// Derived from the address of a reference-counted allocation, so it is only
/// meaningful while the object is alive (one encode call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

impl ObjectId {
    /// Identity of the allocation behind a pointer
    pub fn of<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr.cast::<()>() as usize)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// 3D vector (position, scale, axis, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// 4D vector (colors with alpha, homogeneous positions)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0, w: 1.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Vec4 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Rotation quaternion stored as (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis` (normalized here)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len = (axis.x * axis.x + axis.y * axis.y + axis.z * axis.z).sqrt();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let half = angle * 0.5;
        let s = half.sin() / len;
        Self::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 4x4 double precision transformation matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub m: [[f64; 4]; 4],
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create a new matrix from a flat row-by-row array
    pub fn from_flat(data: &[f64; 16]) -> Self {
        Self {
            m: [
                [data[0], data[1], data[2], data[3]],
                [data[4], data[5], data[6], data[7]],
                [data[8], data[9], data[10], data[11]],
                [data[12], data[13], data[14], data[15]],
            ],
        }
    }

    /// Flatten row by row
    pub fn to_flat(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (row, values) in self.m.iter().enumerate() {
            out[row * 4..row * 4 + 4].copy_from_slice(values);
        }
        out
    }

    pub fn translate(v: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[3][0] = f64::from(v.x);
        out.m[3][1] = f64::from(v.y);
        out.m[3][2] = f64::from(v.z);
        out
    }

    pub fn scale(v: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][0] = f64::from(v.x);
        out.m[1][1] = f64::from(v.y);
        out.m[2][2] = f64::from(v.z);
        out
    }

    pub fn rotate(q: Quat) -> Self {
        let (x, y, z, w) = (
            f64::from(q.x),
            f64::from(q.y),
            f64::from(q.z),
            f64::from(q.w),
        );
        let mut out = Self::IDENTITY;
        out.m[0][0] = 1.0 - 2.0 * (y * y + z * z);
        out.m[0][1] = 2.0 * (x * y + w * z);
        out.m[0][2] = 2.0 * (x * z - w * y);
        out.m[1][0] = 2.0 * (x * y - w * z);
        out.m[1][1] = 1.0 - 2.0 * (x * x + z * z);
        out.m[1][2] = 2.0 * (y * z + w * x);
        out.m[2][0] = 2.0 * (x * z + w * y);
        out.m[2][1] = 2.0 * (y * z - w * x);
        out.m[2][2] = 1.0 - 2.0 * (x * x + y * y);
        out
    }

    /// `self * rhs`; with row vectors `self` is applied first
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m: out }
    }

    /// Local matrix of a position/attitude transform:
    /// `p' = position + attitude * (scale * (p - pivot))`
    pub fn position_attitude(position: Vec3, attitude: Quat, scale: Vec3, pivot: Vec3) -> Self {
        Self::translate(Vec3::new(-pivot.x, -pivot.y, -pivot.z))
            .mul(&Self::scale(scale))
            .mul(&Self::rotate(attitude))
            .mul(&Self::translate(position))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transform a point (row vector convention)
    fn transform_point(m: &Matrix, p: Vec3) -> [f64; 3] {
        let v = [f64::from(p.x), f64::from(p.y), f64::from(p.z), 1.0];
        let mut out = [0.0; 3];
        for (j, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| v[k] * m.m[k][j]).sum();
        }
        out
    }

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-6, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_flat_roundtrip_keeps_translation_in_last_row() {
        let m = Matrix::translate(Vec3::new(1.0, 2.0, 3.0));
        let flat = m.to_flat();
        assert_eq!(&flat[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(Matrix::from_flat(&flat), m);
    }

    #[test]
    fn test_rotate_half_turn_about_z() {
        let m = Matrix::rotate(Quat::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(m.m[0][0], -1.0);
        assert_eq!(m.m[1][1], -1.0);
        assert_eq!(m.m[2][2], 1.0);
        assert_close(transform_point(&m, Vec3::new(1.0, 0.0, 0.0)), [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_position_attitude_order() {
        let q = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
        let m = Matrix::position_attitude(
            Vec3::new(10.0, 0.0, 0.0),
            q,
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        // (2,0,0) - pivot = (1,0,0) -> scaled (2,0,0) -> rotated (0,2,0) -> moved (10,2,0)
        assert_close(transform_point(&m, Vec3::new(2.0, 0.0, 0.0)), [10.0, 2.0, 0.0]);
    }

    #[test]
    fn test_object_id_from_pointer() {
        let a = std::sync::Arc::new(5_u32);
        let b = std::sync::Arc::clone(&a);
        let c = std::sync::Arc::new(5_u32);
        assert_eq!(ObjectId::of(std::sync::Arc::as_ptr(&a)), ObjectId::of(std::sync::Arc::as_ptr(&b)));
        assert_ne!(ObjectId::of(std::sync::Arc::as_ptr(&a)), ObjectId::of(std::sync::Arc::as_ptr(&c)));
    }
}
