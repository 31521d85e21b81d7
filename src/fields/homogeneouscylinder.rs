//! Cylinder with one fixed up direction along its axis.

use super::FieldGeometry;
use crate::math::{Fix12, Vector3};

/// Up is the cylinder axis everywhere inside. Used for tilted platforms and
/// walls that act as floors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HomogeneousCylinderField {
    bottom: Vector3,
    up: Vector3,
    radius: Fix12,
    height: Fix12,
}

impl HomogeneousCylinderField {
    /// Cylinder from `bottom` to `top` with the given radius.
    pub fn new(bottom: Vector3, top: Vector3, radius: Fix12) -> Self {
        let d = top - bottom;
        Self {
            bottom,
            up: d.normalized_twice(),
            radius,
            height: d.length(),
        }
    }

    /// From the two axis end points and a point whose distance to the axis
    /// gives the radius.
    pub fn from_points(bottom: Vector3, top: Vector3, rim: Vector3) -> Self {
        let mut field = Self::new(bottom, top, Fix12::ZERO);
        field.radius = field.axis_distance(&rim);
        field
    }

    pub fn radius(&self) -> Fix12 {
        self.radius
    }

    pub fn height(&self) -> Fix12 {
        self.height
    }

    fn axis_distance(&self, pos: &Vector3) -> Fix12 {
        let rel = *pos - self.bottom;
        (rel - self.up * self.up.dot(&rel)).length()
    }
}

impl FieldGeometry for HomogeneousCylinderField {
    fn fixed_up_vector(&self) -> Option<Vector3> {
        Some(self.up)
    }

    fn native_altitude(&self, pos: &Vector3) -> Option<Fix12> {
        Some(self.up.dot(&(*pos - self.bottom)))
    }

    fn native_contains_with_altitude(&self, pos: &Vector3, altitude: Fix12) -> Option<bool> {
        Some(
            altitude >= Fix12::ZERO
                && altitude <= self.height
                && self.axis_distance(pos) <= self.radius,
        )
    }
}
