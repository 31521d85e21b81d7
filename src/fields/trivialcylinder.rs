//! Upright cylinder that keeps the world frame inside it.

use super::{FieldGeometry, TRIVIAL_ALTITUDE_OFFSET};
use crate::math::{Fix12, Vector3};

/// A bounded region with world up, used to carve a normal area out of a
/// larger curved field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrivialCylinderField {
    bottom: Vector3,
    radius: Fix12,
    height: Fix12,
}

impl TrivialCylinderField {
    pub fn new(bottom: Vector3, radius: Fix12, height: Fix12) -> Self {
        Self {
            bottom,
            radius,
            height,
        }
    }

    /// From the bottom centre and a point on the top rim.
    pub fn from_points(bottom: Vector3, rim: Vector3) -> Self {
        Self::new(bottom, bottom.horz_dist(&rim), (rim.y - bottom.y).abs())
    }

    pub fn radius(&self) -> Fix12 {
        self.radius
    }

    pub fn height(&self) -> Fix12 {
        self.height
    }
}

impl FieldGeometry for TrivialCylinderField {
    fn fixed_up_vector(&self) -> Option<Vector3> {
        Some(Vector3::UP)
    }

    fn native_altitude(&self, pos: &Vector3) -> Option<Fix12> {
        Some(pos.y + TRIVIAL_ALTITUDE_OFFSET)
    }

    fn native_contains(&self, pos: &Vector3) -> Option<bool> {
        let dy = pos.y - self.bottom.y;
        Some(
            dy >= Fix12::ZERO
                && dy <= self.height
                && pos.horz_dist(&self.bottom) <= self.radius,
        )
    }
}
