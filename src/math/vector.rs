//! Coarse and fine 3-D vectors.
//!
//! [`Vector3`] holds [`Fix12`] components and is used for positions and
//! stored unit vectors. [`Vector3Fine`] holds [`Fix24`] components and is used
//! for unit vectors while they are being built. Normalizing always happens at
//! fine precision and is rounded once at the end.

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Shl, Shr, Sub, SubAssign};

use super::fixed::{Fix12, Fix24, isqrt_u128};
use super::matrix::Matrix3x3;
use super::trig::{self, atan2, cos_fine, sin_fine};

/// Unit vector in 8.24 for the raw triple, or zero for a zero triple.
fn unit_raw(x: i64, y: i64, z: i64) -> [i32; 3] {
    let sq = (x as i128 * x as i128 + y as i128 * y as i128 + z as i128 * z as i128) as u128;
    let mag = isqrt_u128(sq) as i128;
    if mag == 0 {
        return [0; 3];
    }
    let scale = |c: i64| (((c as i128) << 24) / mag) as i32;
    [scale(x), scale(y), scale(z)]
}

#[inline]
fn round_shift(wide: i128, shift: u32) -> i32 {
    ((wide + (1i128 << (shift - 1))) >> shift) as i32
}

/// 3-D vector with 20.12 components.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Vector3 {
    pub x: Fix12,
    pub y: Fix12,
    pub z: Fix12,
}

/// 3-D vector with 8.24 components.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Vector3Fine {
    pub x: Fix24,
    pub y: Fix24,
    pub z: Fix24,
}

impl Vector3 {
    pub const ZERO: Self = Self::from_raw(0, 0, 0);
    pub const UP: Self = Self::from_raw(0, 0x1000, 0);
    pub const X: Self = Self::from_raw(0x1000, 0, 0);
    pub const Z: Self = Self::from_raw(0, 0, 0x1000);

    pub const fn new(x: Fix12, y: Fix12, z: Fix12) -> Self {
        Self { x, y, z }
    }

    pub const fn from_raw(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: Fix12::from_raw(x),
            y: Fix12::from_raw(y),
            z: Fix12::from_raw(z),
        }
    }

    /// Build from floats. For authoring data and tests.
    pub fn from_num(x: f64, y: f64, z: f64) -> Self {
        Self::new(Fix12::from_num(x), Fix12::from_num(y), Fix12::from_num(z))
    }

    pub fn to_f64(self) -> [f64; 3] {
        [self.x.to_f64(), self.y.to_f64(), self.z.to_f64()]
    }

    fn raw_i64(&self) -> [i64; 3] {
        [self.x.raw() as i64, self.y.raw() as i64, self.z.raw() as i64]
    }

    fn raw_wide(&self) -> [i128; 3] {
        [self.x.raw() as i128, self.y.raw() as i128, self.z.raw() as i128]
    }

    /// Dot product at full precision, 24 fractional bits.
    pub fn dot_wide(&self, other: &Self) -> i128 {
        let a = self.raw_i64();
        let b = other.raw_i64();
        a.iter().zip(b.iter()).map(|(p, q)| (*p * *q) as i128).sum()
    }

    /// Dot product rounded once.
    pub fn dot(&self, other: &Self) -> Fix12 {
        Fix12::from_raw(round_shift(self.dot_wide(other), 12))
    }

    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.raw_wide();
        let [bx, by, bz] = other.raw_wide();
        Self::from_raw(
            round_shift(ay * bz - az * by, 12),
            round_shift(az * bx - ax * bz, 12),
            round_shift(ax * by - ay * bx, 12),
        )
    }

    pub fn length(&self) -> Fix12 {
        Fix12::from_raw(isqrt_u128(self.dot_wide(self) as u128) as i32)
    }

    /// Length of the projection onto the XZ plane.
    pub fn horz_length(&self) -> Fix12 {
        Self::new(self.x, Fix12::ZERO, self.z).length()
    }

    pub fn dist(&self, other: &Self) -> Fix12 {
        (*self - *other).length()
    }

    pub fn horz_dist(&self, other: &Self) -> Fix12 {
        (*self - *other).horz_length()
    }

    /// Unit vector in the same direction at fine precision.
    ///
    /// A zero vector has no direction; the result is then zero.
    pub fn normalized_fine(&self) -> Vector3Fine {
        let [x, y, z] = self.raw_i64();
        let [x, y, z] = unit_raw(x, y, z);
        Vector3Fine::from_raw(x, y, z)
    }

    pub fn normalized(&self) -> Self {
        self.normalized_fine().to_coarse()
    }

    /// Normalize, round, and normalize again. The second pass removes the
    /// first order rounding error of the first.
    pub fn normalized_twice(&self) -> Self {
        self.normalized().normalized()
    }

    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    pub fn normalize_twice(&mut self) {
        *self = self.normalized_twice();
    }

    /// Exact widening. Only meaningful for components within +-128.
    pub fn to_fine(&self) -> Vector3Fine {
        Vector3Fine::new(self.x.to_fine(), self.y.to_fine(), self.z.to_fine())
    }

    /// Rotate this point about `pivot`: `pivot + m * (self - pivot)`.
    pub fn rotate_around(&self, pivot: &Self, m: &Matrix3x3) -> Self {
        *pivot + *m * (*self - *pivot)
    }

    /// Unsigned angle to `other` in `0..=0x8000`.
    pub fn angle_to(&self, other: &Self) -> i32 {
        let c = self.cross(other);
        let sin = isqrt_u128(c.dot_wide(&c) as u128) as i64;
        let cos = round_shift(self.dot_wide(other), 12) as i64;
        atan2(sin, cos) as u16 as i32
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Vector3Fine {
    pub const ZERO: Self = Self::from_raw(0, 0, 0);
    pub const UP: Self = Self::from_raw(0, 0x100_0000, 0);
    pub const X: Self = Self::from_raw(0x100_0000, 0, 0);
    pub const Z: Self = Self::from_raw(0, 0, 0x100_0000);

    pub const fn new(x: Fix24, y: Fix24, z: Fix24) -> Self {
        Self { x, y, z }
    }

    pub const fn from_raw(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: Fix24::from_raw(x),
            y: Fix24::from_raw(y),
            z: Fix24::from_raw(z),
        }
    }

    pub fn from_num(x: f64, y: f64, z: f64) -> Self {
        Self::new(Fix24::from_num(x), Fix24::from_num(y), Fix24::from_num(z))
    }

    pub fn to_f64(self) -> [f64; 3] {
        [self.x.to_f64(), self.y.to_f64(), self.z.to_f64()]
    }

    fn raw_i64(&self) -> [i64; 3] {
        [self.x.raw() as i64, self.y.raw() as i64, self.z.raw() as i64]
    }

    fn raw_wide(&self) -> [i128; 3] {
        [self.x.raw() as i128, self.y.raw() as i128, self.z.raw() as i128]
    }

    /// Dot product at full precision, 48 fractional bits.
    pub fn dot_wide(&self, other: &Self) -> i128 {
        let a = self.raw_i64();
        let b = other.raw_i64();
        a.iter().zip(b.iter()).map(|(p, q)| (*p * *q) as i128).sum()
    }

    pub fn dot(&self, other: &Self) -> Fix24 {
        Fix24::from_raw(round_shift(self.dot_wide(other), 24))
    }

    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.raw_wide();
        let [bx, by, bz] = other.raw_wide();
        Self::from_raw(
            round_shift(ay * bz - az * by, 24),
            round_shift(az * bx - ax * bz, 24),
            round_shift(ax * by - ay * bx, 24),
        )
    }

    pub fn length(&self) -> Fix24 {
        Fix24::from_raw(isqrt_u128(self.dot_wide(self) as u128) as i32)
    }

    pub fn normalized(&self) -> Self {
        let [x, y, z] = self.raw_i64();
        let [x, y, z] = unit_raw(x, y, z);
        Self::from_raw(x, y, z)
    }

    pub fn normalized_twice(&self) -> Self {
        self.normalized().normalized()
    }

    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Round every component to 12 fractional bits.
    pub fn to_coarse(&self) -> Vector3 {
        Vector3::new(self.x.to_coarse(), self.y.to_coarse(), self.z.to_coarse())
    }

    /// Normalize, round to coarse, then normalize the coarse vector again.
    pub fn normalized_twice_coarse(&self) -> Vector3 {
        self.normalized().to_coarse().normalized()
    }

    /// Unsigned angle to `other` in `0..=0x8000`.
    pub fn angle_to(&self, other: &Self) -> i32 {
        let c = self.cross(other);
        let sin = isqrt_u128(c.dot_wide(&c) as u128) as i64;
        let cos = round_shift(self.dot_wide(other), 24) as i64;
        atan2(sin, cos) as u16 as i32
    }

    /// Rotate this unit vector toward unit `target` so the angle between them
    /// is at most `max_angle`. Vectors already within range are untouched.
    pub fn set_max_angle_to_normalized(&mut self, target: &Self, max_angle: i32) {
        let dot = self.dot(target);
        let cos = cos_fine(max_angle);
        if cos < dot {
            return;
        }
        let mut side = (*self - *target * dot).normalized();
        if side == Self::ZERO {
            // Exactly opposite: any perpendicular works.
            side = some_orthonormal_fine(target);
        }
        *self = (side * sin_fine(max_angle) + *target * cos).normalized();
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// A unit vector orthogonal to `v`, built from its two largest components.
pub fn some_orthonormal(v: &Vector3) -> Vector3 {
    let [x, y, z] = v.raw_i64();
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let res = if xx < yy && xx < zz {
        Vector3::new(Fix12::ZERO, v.z, -v.y)
    } else if yy < zz {
        Vector3::new(-v.z, Fix12::ZERO, v.x)
    } else {
        Vector3::new(v.y, -v.x, Fix12::ZERO)
    };
    res.normalized_twice()
}

fn some_orthonormal_fine(v: &Vector3Fine) -> Vector3Fine {
    let [x, y, z] = v.raw_i64();
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let res = if xx < yy && xx < zz {
        Vector3Fine::new(Fix24::ZERO, v.z, -v.y)
    } else if yy < zz {
        Vector3Fine::new(-v.z, Fix24::ZERO, v.x)
    } else {
        Vector3Fine::new(v.y, -v.x, Fix24::ZERO)
    };
    res.normalized_twice()
}

/// Unsigned angle between two coarse unit vectors, in degrees. Diagnostics only.
pub fn angle_between_degrees(a: &Vector3, b: &Vector3) -> f64 {
    trig::angle_to_degrees(a.angle_to(b))
}

macro_rules! vector_ops {
    ($vec:ident, $scalar:ident) => {
        impl Add for $vec {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
            }
        }

        impl Sub for $vec {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
            }
        }

        impl Neg for $vec {
            type Output = Self;
            fn neg(self) -> Self {
                Self::new(-self.x, -self.y, -self.z)
            }
        }

        impl Mul<$scalar> for $vec {
            type Output = Self;
            fn mul(self, rhs: $scalar) -> Self {
                Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
            }
        }

        impl Mul<i32> for $vec {
            type Output = Self;
            fn mul(self, rhs: i32) -> Self {
                Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
            }
        }

        impl Shl<u32> for $vec {
            type Output = Self;
            fn shl(self, rhs: u32) -> Self {
                Self::new(self.x << rhs, self.y << rhs, self.z << rhs)
            }
        }

        impl Shr<u32> for $vec {
            type Output = Self;
            fn shr(self, rhs: u32) -> Self {
                Self::new(self.x >> rhs, self.y >> rhs, self.z >> rhs)
            }
        }

        impl AddAssign for $vec {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl SubAssign for $vec {
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl MulAssign<$scalar> for $vec {
            fn mul_assign(&mut self, rhs: $scalar) {
                *self = *self * rhs;
            }
        }
    };
}

vector_ops!(Vector3, Fix12);
vector_ops!(Vector3Fine, Fix24);
