//! 3x3 rotation matrices stored as three coarse column vectors.
//!
//! Column 0 is the local "right" axis, column 1 is "up" and column 2 is
//! "forward". A gravity frame is always orthonormal within
//! [`ORTHONORMAL_TOLERANCE`].

use std::ops::Mul;

use super::fixed::Fix12;
use super::vector::Vector3;

/// Largest accepted deviation, in raw 20.12 units, of a column length from 1
/// or of a column dot product from 0.
pub const ORTHONORMAL_TOLERANCE: i32 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Matrix3x3 {
    pub c0: Vector3,
    pub c1: Vector3,
    pub c2: Vector3,
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3x3 {
    pub const IDENTITY: Self = Self {
        c0: Vector3::X,
        c1: Vector3::UP,
        c2: Vector3::Z,
    };

    pub const fn from_columns(c0: Vector3, c1: Vector3, c2: Vector3) -> Self {
        Self { c0, c1, c2 }
    }

    pub fn transpose(&self) -> Self {
        Self {
            c0: Vector3::new(self.c0.x, self.c1.x, self.c2.x),
            c1: Vector3::new(self.c0.y, self.c1.y, self.c2.y),
            c2: Vector3::new(self.c0.z, self.c1.z, self.c2.z),
        }
    }

    /// Largest deviation from orthonormality, in raw units.
    pub fn orthonormal_error(&self) -> i32 {
        let cols = [self.c0, self.c1, self.c2];
        let mut worst = 0;
        for (i, a) in cols.iter().enumerate() {
            worst = worst.max((a.dot(a).raw() - Fix12::ONE.raw()).abs());
            for b in cols.iter().skip(i + 1) {
                worst = worst.max(a.dot(b).raw().abs());
            }
        }
        worst
    }

    pub fn is_orthonormal(&self) -> bool {
        self.orthonormal_error() <= ORTHONORMAL_TOLERANCE
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Mul<Vector3> for Matrix3x3 {
    type Output = Vector3;

    /// `c0 * v.x + c1 * v.y + c2 * v.z`, summed at full precision.
    fn mul(self, v: Vector3) -> Vector3 {
        let row = |a: Fix12, b: Fix12, c: Fix12| {
            let wide = a.mul_wide(v.x) as i128 + b.mul_wide(v.y) as i128 + c.mul_wide(v.z) as i128;
            Fix12::from_raw(((wide + 0x800) >> 12) as i32)
        };
        Vector3::new(
            row(self.c0.x, self.c1.x, self.c2.x),
            row(self.c0.y, self.c1.y, self.c2.y),
            row(self.c0.z, self.c1.z, self.c2.z),
        )
    }
}

impl Mul for Matrix3x3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            c0: self * rhs.c0,
            c1: self * rhs.c1,
            c2: self * rhs.c2,
        }
    }
}
