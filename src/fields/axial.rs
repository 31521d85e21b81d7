//! Gravity around a line segment, like a tube or a bar.

use super::FieldGeometry;
use crate::math::{Fix12, Vector3};

/// Up points away from the segment `[start, end]`. Only the cylindrical
/// middle is claimed; the hemispherical caps are left to other fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxialField {
    start: Vector3,
    axis: Vector3,
    length: Fix12,
    radius: Fix12,
}

impl AxialField {
    pub fn new(start: Vector3, end: Vector3, radius: Fix12) -> Self {
        let d = end - start;
        Self {
            start,
            axis: d.normalized(),
            length: d.length(),
            radius,
        }
    }

    pub fn radius(&self) -> Fix12 {
        self.radius
    }

    pub fn length(&self) -> Fix12 {
        self.length
    }

    /// Signed distance of the projection of `pos` along the axis.
    fn along(&self, pos: &Vector3) -> Fix12 {
        self.axis.dot(&(*pos - self.start))
    }
}

impl FieldGeometry for AxialField {
    fn native_altitude_vector(&self, pos: &Vector3) -> Option<Vector3> {
        let t = self.along(pos).max(Fix12::ZERO).min(self.length);
        Some(*pos - (self.start + self.axis * t))
    }

    fn native_contains_with_altitude(&self, pos: &Vector3, altitude: Fix12) -> Option<bool> {
        let t = self.along(pos);
        Some(altitude <= self.radius && t >= Fix12::ZERO && t <= self.length)
    }
}
