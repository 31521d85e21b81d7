//! Building gravity-aligned bases and moving angles between them.

use super::expr;
use super::fixed::Fix24;
use super::matrix::Matrix3x3;
use super::trig::{Angle, atan2};
use super::vector::{Vector3, Vector3Fine};

/// Squared length below which a steering axis is considered parallel to up.
const PARALLEL_EPSILON_SQ: Fix24 = Fix24::from_raw(0x100);

/// Forward axis for a frame with the given `up`, steered by two view axes.
///
/// `x_axis` and `y_axis` usually come from the camera: the result lies in
/// the plane orthogonal to `up` and follows the view as closely as a sphere
/// allows. The result is a fine unit vector.
pub fn spherical_forward_field(
    x_axis: &Vector3Fine,
    y_axis: &Vector3Fine,
    up: &Vector3Fine,
) -> Vector3Fine {
    let mut res = x_axis.cross(up);
    let mut u = y_axis.cross(up);
    if u.dot(&u) > PARALLEL_EPSILON_SQ {
        u.normalize();
        let a = res.dot(&u);
        let b = a * a - res.dot(&res) + Fix24::ONE;
        let k = b.max(Fix24::ZERO).sqrt() * up.dot(x_axis).signum() + a;
        res -= u * k;
    }
    res.normalized()
}

/// Full basis with column 1 equal to `up` and the forward axis from
/// [`spherical_forward_field`].
pub fn spherical_matrix_field(
    x_axis: &Vector3Fine,
    y_axis: &Vector3Fine,
    up: &Vector3Fine,
) -> Matrix3x3 {
    let forward = spherical_forward_field(x_axis, y_axis, up);
    let c0 = expr::cross(up, &forward).eval().normalized_twice_coarse();
    Matrix3x3::from_columns(
        c0,
        up.normalized_twice_coarse(),
        forward.normalized_twice_coarse(),
    )
}

/// Offset that re-expresses a heading in `from` as a heading in `to`.
///
/// For two bases sharing an up axis this is the signed angle from the
/// forward axis of `to` to the forward axis of `from`. The sine term is
/// antisymmetric in the two bases, so `offset(to, from) == -offset(from, to)`.
pub fn angle_offset(from: &Matrix3x3, to: &Matrix3x3) -> Angle {
    let s = from.c2.dot_wide(&to.c0) - to.c2.dot_wide(&from.c0);
    let c = 2 * from.c2.dot_wide(&to.c2);
    atan2(s as i64, c as i64)
}

/// Re-express `angle`, measured in basis `from`, in basis `to`.
pub fn convert_angle(angle: Angle, from: &Matrix3x3, to: &Matrix3x3) -> Angle {
    angle.wrapping_add(angle_offset(from, to))
}

/// Unit forward direction of a heading within a basis.
pub fn heading_direction(angle: Angle, basis: &Matrix3x3) -> Vector3 {
    let (s, c) = (
        super::trig::sin_fine(angle as i32).to_coarse(),
        super::trig::cos_fine(angle as i32).to_coarse(),
    );
    (basis.c0 * s + basis.c2 * c).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::trig::degrees_to_angle;

    fn rotation_y(deg: f64) -> Matrix3x3 {
        let (s, c) = deg.to_radians().sin_cos();
        Matrix3x3::from_columns(
            Vector3::from_num(c, 0.0, -s),
            Vector3::UP,
            Vector3::from_num(s, 0.0, c),
        )
    }

    fn tilted(up: Vector3) -> Matrix3x3 {
        let up = up.normalized_fine();
        spherical_matrix_field(&Vector3Fine::X, &Vector3Fine::UP, &up)
    }

    fn angle_diff(a: Angle, b: Angle) -> i32 {
        (a.wrapping_sub(b) as i32).abs()
    }

    #[test]
    fn forward_field_is_orthogonal_to_up() {
        for up in [
            Vector3::UP,
            Vector3::from_num(1.0, 1.0, 0.0),
            Vector3::from_num(-0.2, 0.3, 0.9),
            Vector3::from_num(0.0, -1.0, 0.01),
        ] {
            let up = up.normalized_fine();
            let f = spherical_forward_field(&Vector3Fine::X, &Vector3Fine::UP, &up);
            assert!(f.dot(&up).raw().abs() < 0x400, "up {up:?} forward {f:?}");
            assert!((f.length().raw() - 0x100_0000).abs() < 0x400);
        }
    }

    #[test]
    fn matrix_field_is_orthonormal() {
        for up in [
            Vector3::UP,
            Vector3::from_num(1.0, 1.0, 0.0),
            Vector3::from_num(-0.2, 0.3, 0.9),
            Vector3::from_num(0.5, -1.0, 0.25),
        ] {
            let m = tilted(up);
            assert!(m.is_orthonormal(), "{m:?} error {}", m.orthonormal_error());
            assert!((m.c1 - up.normalized()).length().raw() <= 4);
        }
    }

    #[test]
    fn upright_field_is_identity() {
        assert_eq!(tilted(Vector3::UP), Matrix3x3::IDENTITY);
    }

    #[test]
    fn offset_between_yaw_rotations() {
        let a = rotation_y(0.0);
        let b = rotation_y(30.0);
        let off = angle_offset(&a, &b);
        assert!(angle_diff(off, -degrees_to_angle(30.0) as i16) <= 2);
        assert_eq!(angle_offset(&b, &a), off.wrapping_neg());
    }

    #[test]
    fn converted_heading_keeps_world_direction() {
        let from = rotation_y(10.0);
        let to = rotation_y(75.0);
        let h = degrees_to_angle(40.0) as i16;
        let converted = convert_angle(h, &from, &to);
        let d0 = heading_direction(h, &from);
        let d1 = heading_direction(converted, &to);
        assert!((d0 - d1).length().raw() <= 8);
    }

    #[test]
    fn round_trip_is_exact_for_any_pair() {
        let bases = [
            Matrix3x3::IDENTITY,
            rotation_y(123.0),
            tilted(Vector3::from_num(1.0, 1.0, 0.0)),
            tilted(Vector3::from_num(-0.2, 0.3, 0.9)),
            tilted(Vector3::from_num(0.0, -1.0, 0.3)),
        ];
        for from in &bases {
            for to in &bases {
                for h in [0i16, 1000, -12345, 0x7fff, i16::MIN] {
                    let back = convert_angle(convert_angle(h, from, to), to, from);
                    assert!(angle_diff(back, h) <= 1);
                }
            }
        }
    }
}
