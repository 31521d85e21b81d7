//! Spherical gravity around a point.

use super::FieldGeometry;
use crate::math::{Fix12, Vector3};

/// Up points away from the centre; the field reaches out to `radius`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadialField {
    center: Vector3,
    radius: Fix12,
}

impl RadialField {
    pub fn new(center: Vector3, radius: Fix12) -> Self {
        Self { center, radius }
    }

    /// From the centre and a point on the bounding sphere.
    pub fn from_points(center: Vector3, surface: Vector3) -> Self {
        Self::new(center, center.dist(&surface))
    }

    pub fn center(&self) -> Vector3 {
        self.center
    }

    pub fn radius(&self) -> Fix12 {
        self.radius
    }
}

impl FieldGeometry for RadialField {
    fn native_altitude_vector(&self, pos: &Vector3) -> Option<Vector3> {
        Some(*pos - self.center)
    }

    fn native_contains_with_altitude(&self, _pos: &Vector3, altitude: Fix12) -> Option<bool> {
        Some(altitude <= self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet() -> RadialField {
        RadialField::from_points(Vector3::from_num(0.0, -100.0, 0.0), Vector3::ZERO)
    }

    #[test]
    fn radius_from_surface_point() {
        assert_eq!(planet().radius(), Fix12::from_int(100));
    }

    #[test]
    fn up_points_away_from_center() {
        let f = planet();
        let p = Vector3::from_num(0.0, -100.0, 50.0);
        assert_eq!(f.up_vector(&p), Vector3::Z);
        assert_eq!(f.altitude(&p), Fix12::from_int(50));
        let q = Vector3::from_num(30.0, -60.0, 0.0);
        assert_eq!(f.altitude(&q), Fix12::from_int(50));
        let up = f.up_vector(&q);
        assert!((up - Vector3::from_num(0.6, 0.8, 0.0)).length().raw() <= 1);
    }

    #[test]
    fn contains_within_radius() {
        let f = planet();
        assert!(f.contains(&Vector3::ZERO));
        assert!(f.contains(&Vector3::from_num(0.0, -100.0, 99.0)));
        assert!(!f.contains(&Vector3::from_num(0.0, 1.0, 0.0)));
    }
}
