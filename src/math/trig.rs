//! Binary angles and deterministic trigonometry.
//!
//! Angles are 16-bit binary angles: `0x10000` is one full turn, so `0x4000`
//! is 90 degrees and `0x8000` is 180 degrees. Signed angles are `i16` and wrap.
//! Unsigned magnitudes in `0..=0x8000` are carried as `i32`.

use super::fixed::Fix24;

pub type Angle = i16;

pub const QUARTER_TURN: i32 = 0x4000;
pub const HALF_TURN: i32 = 0x8000;
/// One degree, rounded to the nearest binary angle unit.
pub const ONE_DEGREE: i32 = 182;

// Cubic cosine approximation coefficients on x in [0, 1] (one quarter turn).
const COS_C1: Fix24 = Fix24::from_raw(0x0141_ff5e);
const COS_C2: Fix24 = Fix24::from_raw(0x0016_1e72);
const COS_C3: Fix24 = Fix24::from_raw(0x002b_e0ed);

/// atan(2^-i) for i in 0..24, in 32-bit binary angle units.
const ATAN_TABLE: [u32; 24] = [
    0x2000_0000,
    0x12e4_051e,
    0x09fb_385b,
    0x0511_11d4,
    0x028b_0d43,
    0x0145_d7e1,
    0x00a2_f61e,
    0x0051_7c55,
    0x0028_be53,
    0x0014_5f2f,
    0x000a_2f98,
    0x0005_17cc,
    0x0002_8be6,
    0x0001_45f3,
    0x0000_a2fa,
    0x0000_517d,
    0x0000_28be,
    0x0000_145f,
    0x0000_0a30,
    0x0000_0518,
    0x0000_028c,
    0x0000_0146,
    0x0000_00a3,
    0x0000_0051,
];

/// Convert degrees to binary angle units, rounding to nearest.
pub fn degrees_to_angle(degrees: f64) -> i32 {
    (degrees * 65536.0 / 360.0).round() as i32
}

pub fn angle_to_degrees(angle: i32) -> f64 {
    angle as f64 * 360.0 / 65536.0
}

/// Cosine of a binary angle in 8.24 fixed point.
///
/// Any `i32` is accepted and reduced modulo one turn.
pub fn cos_fine(angle: i32) -> Fix24 {
    let mut b = (angle as i16 as i32).abs();
    let flip = b > QUARTER_TURN;
    if flip {
        b = HALF_TURN - b;
    }
    let x = Fix24::from_raw(b << 10);
    let res = Fix24::ONE - (COS_C1 - (COS_C3 * x + COS_C2) * x) * x * x;
    if flip { -res } else { res }
}

/// Sine of a binary angle in 8.24 fixed point.
pub fn sin_fine(angle: i32) -> Fix24 {
    cos_fine(QUARTER_TURN.wrapping_sub(angle))
}

/// Angle of the vector `(x, y)` measured from the +x axis toward +y.
///
/// Inputs can be any raw values on a common scale. The result is odd in `y`
/// bit for bit, and `atan2(0, 0) == 0`.
pub fn atan2(y: i64, x: i64) -> Angle {
    if y < 0 {
        atan2_upper(y.saturating_neg(), x).wrapping_neg()
    } else {
        atan2_upper(y, x)
    }
}

fn atan2_upper(y: i64, x: i64) -> Angle {
    if y == 0 && x >= 0 {
        return 0;
    }
    let (mut x, mut y, mut acc) = if x < 0 {
        (y, x.saturating_neg(), 0x4000_0000u32)
    } else {
        (x, y, 0)
    };

    // Bring the larger component to bit 40 so the iterations keep precision
    // without overflowing.
    let m = x.max(y);
    let shift = m.leading_zeros() as i32 - 23;
    if shift > 0 {
        x <<= shift;
        y <<= shift;
    } else {
        x >>= -shift;
        y >>= -shift;
    }

    for (i, &step) in ATAN_TABLE.iter().enumerate() {
        let dx = x >> i;
        let dy = y >> i;
        if y > 0 {
            x += dy;
            y -= dx;
            acc = acc.wrapping_add(step);
        } else if y < 0 {
            x -= dy;
            y += dx;
            acc = acc.wrapping_sub(step);
        } else {
            break;
        }
    }
    (acc.wrapping_add(0x8000) >> 16) as u16 as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn cos_hits_cardinal_points() {
        assert_eq!(cos_fine(0), Fix24::ONE);
        assert!(cos_fine(QUARTER_TURN).raw().abs() < 0x100);
        assert!(approx_eq(cos_fine(HALF_TURN).to_f64(), -1.0, 1e-4));
        assert!(approx_eq(sin_fine(QUARTER_TURN).to_f64(), 1.0, 1e-6));
    }

    #[test]
    fn cos_tracks_float_cosine() {
        for deg in (-360..=360).step_by(5) {
            let got = cos_fine(degrees_to_angle(deg as f64)).to_f64();
            let want = (deg as f64).to_radians().cos();
            assert!(approx_eq(got, want, 2e-3), "cos({deg}) = {got}, want {want}");
        }
    }

    #[test]
    fn cos_is_even() {
        for a in (0..0x8000).step_by(97) {
            assert_eq!(cos_fine(a), cos_fine(-a));
        }
    }

    #[test]
    fn atan2_quadrants() {
        let tol = 2;
        assert_eq!(atan2(0, 100), 0);
        assert!((atan2(100, 0) as i32 - QUARTER_TURN).abs() <= tol);
        assert!((atan2(100, 100) as i32 - 0x2000).abs() <= tol);
        assert!((atan2(-100, 100) as i32 + 0x2000).abs() <= tol);
        assert!((atan2(0, -100) as u16 as i32 - HALF_TURN).abs() <= tol);
        assert!((atan2(100, -100) as i32 - 0x6000).abs() <= tol);
    }

    #[test]
    fn atan2_is_odd_and_zero_at_origin() {
        assert_eq!(atan2(0, 0), 0);
        for (y, x) in [(1, 7), (123_456, -77), (5, 0), (9_000_000_000, 3), (17, -17)] {
            assert_eq!(atan2(-y, x), atan2(y, x).wrapping_neg());
        }
    }

    #[test]
    fn atan2_matches_float() {
        for deg in (-175..=175).step_by(7) {
            let r = (deg as f64).to_radians();
            let y = (r.sin() * 16_777_216.0) as i64;
            let x = (r.cos() * 16_777_216.0) as i64;
            let got = angle_to_degrees(atan2(y, x) as i32);
            assert!(approx_eq(got, deg as f64, 0.02), "atan2 at {deg} gave {got}");
        }
    }

    #[test]
    fn degree_conversion() {
        assert_eq!(degrees_to_angle(1.0), ONE_DEGREE);
        assert_eq!(degrees_to_angle(90.0), QUARTER_TURN);
        assert_eq!(degrees_to_angle(180.0), HALF_TURN);
    }
}
