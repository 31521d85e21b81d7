//! Fixed-point scalars.
//!
//! Two formats share one implementation:
//! - [`Fix12`]: 20.12, used for positions, coarse unit vectors and matrices.
//! - [`Fix24`]: 8.24, used for fine unit vectors and intermediate products.
//!
//! All arithmetic is integer-only so results are identical on every platform.
//! Multiplication rounds to nearest, division truncates toward zero, and
//! overflow wraps like the hardware registers these formats come from.

use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

/// Integer square root of a 128-bit value, rounded down.
pub fn isqrt_u128(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Newton iteration from a power of two above the root.
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

macro_rules! fixed_type {
    ($(#[$meta:meta])* $name:ident, $shift:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Number of fractional bits.
            pub const SHIFT: u32 = $shift;
            pub const ZERO: Self = Self(0);
            pub const ONE: Self = Self(1 << $shift);
            pub const HALF: Self = Self(1 << ($shift - 1));
            pub const MAX: Self = Self(i32::MAX);
            pub const MIN: Self = Self(i32::MIN);

            /// Wrap a raw fixed-point value.
            #[inline]
            pub const fn from_raw(raw: i32) -> Self {
                Self(raw)
            }

            /// The raw fixed-point value.
            #[inline]
            pub const fn raw(self) -> i32 {
                self.0
            }

            #[inline]
            pub const fn from_int(value: i32) -> Self {
                Self(value.wrapping_shl($shift))
            }

            /// Convert from a float, rounding to the nearest representable value.
            ///
            /// Only meant for authoring data and diagnostics.
            pub fn from_num(value: f64) -> Self {
                Self((value * (1i64 << $shift) as f64).round() as i32)
            }

            pub fn to_f32(self) -> f32 {
                self.0 as f32 / (1i64 << $shift) as f32
            }

            pub fn to_f64(self) -> f64 {
                self.0 as f64 / (1i64 << $shift) as f64
            }

            #[inline]
            pub const fn abs(self) -> Self {
                Self(self.0.wrapping_abs())
            }

            /// -1, 0 or 1 as a plain integer.
            #[inline]
            pub const fn signum(self) -> i32 {
                self.0.signum()
            }

            #[inline]
            pub const fn is_negative(self) -> bool {
                self.0 < 0
            }

            /// Square root. Negative inputs yield zero.
            pub fn sqrt(self) -> Self {
                if self.0 <= 0 {
                    return Self::ZERO;
                }
                Self(isqrt_u128((self.0 as u128) << $shift) as i32)
            }

            /// Product kept at double precision (`2 * SHIFT` fractional bits).
            #[inline]
            pub const fn mul_wide(self, rhs: Self) -> i64 {
                self.0 as i64 * rhs.0 as i64
            }

            /// Round a double precision product back to this format.
            #[inline]
            pub const fn from_wide(wide: i64) -> Self {
                Self(((wide + (1i64 << ($shift - 1))) >> $shift) as i32)
            }

            /// Move toward `target` by at most `step`, never overshooting.
            pub fn approach_linear(&mut self, target: Self, step: Self) -> bool {
                if *self < target {
                    *self = if target.0 as i64 - self.0 as i64 > step.0 as i64 {
                        *self + step
                    } else {
                        target
                    };
                } else if *self > target {
                    *self = if self.0 as i64 - target.0 as i64 > step.0 as i64 {
                        *self - step
                    } else {
                        target
                    };
                }
                *self == target
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x} = {})", stringify!($name), self.0, self.to_f64())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_f64())
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0.wrapping_add(rhs.0))
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0.wrapping_sub(rhs.0))
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self(self.0.wrapping_neg())
            }
        }

        impl Mul for $name {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self::from_wide(self.mul_wide(rhs))
            }
        }

        /// Scaling by a plain integer is exact.
        impl Mul<i32> for $name {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: i32) -> Self {
                Self(self.0.wrapping_mul(rhs))
            }
        }

        impl Mul<$name> for i32 {
            type Output = $name;
            #[inline]
            fn mul(self, rhs: $name) -> $name {
                rhs * self
            }
        }

        /// Division truncates toward zero. A zero divisor saturates by the
        /// sign of the dividend instead of trapping.
        impl Div for $name {
            type Output = Self;
            fn div(self, rhs: Self) -> Self {
                if rhs.0 == 0 {
                    return if self.0 >= 0 { Self::MAX } else { Self::MIN };
                }
                let q = ((self.0 as i64) << $shift) / rhs.0 as i64;
                Self(q.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            }
        }

        impl Div<i32> for $name {
            type Output = Self;
            fn div(self, rhs: i32) -> Self {
                if rhs == 0 {
                    return if self.0 >= 0 { Self::MAX } else { Self::MIN };
                }
                Self(self.0.wrapping_div(rhs))
            }
        }

        impl Shl<u32> for $name {
            type Output = Self;
            #[inline]
            fn shl(self, rhs: u32) -> Self {
                Self(self.0.wrapping_shl(rhs))
            }
        }

        impl Shr<u32> for $name {
            type Output = Self;
            #[inline]
            fn shr(self, rhs: u32) -> Self {
                Self(self.0 >> rhs.min(31))
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl MulAssign for $name {
            fn mul_assign(&mut self, rhs: Self) {
                *self = *self * rhs;
            }
        }

        impl DivAssign for $name {
            fn div_assign(&mut self, rhs: Self) {
                *self = *self / rhs;
            }
        }

        impl ShlAssign<u32> for $name {
            fn shl_assign(&mut self, rhs: u32) {
                *self = *self << rhs;
            }
        }

        impl ShrAssign<u32> for $name {
            fn shr_assign(&mut self, rhs: u32) {
                *self = *self >> rhs;
            }
        }
    };
}

fixed_type!(
    /// Coarse fixed-point scalar with 12 fractional bits.
    Fix12,
    12
);

fixed_type!(
    /// Fine fixed-point scalar with 24 fractional bits.
    Fix24,
    24
);

impl Fix12 {
    /// Exact widening to 24 fractional bits. Values outside +-128 wrap.
    #[inline]
    pub const fn to_fine(self) -> Fix24 {
        Fix24::from_raw(self.raw().wrapping_shl(12))
    }
}

impl Fix24 {
    /// Narrow to 12 fractional bits, rounding to nearest.
    #[inline]
    pub const fn to_coarse(self) -> Fix12 {
        Fix12::from_raw(((self.raw() as i64 + 0x800) >> 12) as i32)
    }
}

impl From<Fix12> for Fix24 {
    fn from(value: Fix12) -> Self {
        value.to_fine()
    }
}

impl From<Fix24> for Fix12 {
    fn from(value: Fix24) -> Self {
        value.to_coarse()
    }
}
