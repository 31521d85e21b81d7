//! The default field: world up everywhere.

use super::{FieldGeometry, TRIVIAL_ALTITUDE_OFFSET};
use crate::math::{Fix12, Vector3};

/// Owns every point no authored field claims.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrivialField;

impl FieldGeometry for TrivialField {
    fn fixed_up_vector(&self) -> Option<Vector3> {
        Some(Vector3::UP)
    }

    fn native_altitude(&self, pos: &Vector3) -> Option<Fix12> {
        Some(pos.y + TRIVIAL_ALTITUDE_OFFSET)
    }

    fn native_contains(&self, _pos: &Vector3) -> Option<bool> {
        Some(true)
    }
}
