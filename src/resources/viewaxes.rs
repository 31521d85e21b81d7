//! View information consumed by the primary actor's frame.

use bevy_ecs::prelude::Resource;

use crate::math::Vector3;

/// Columns of the inverse view matrix: the camera's right and backward axes
/// in world space. When present, the primary actor's forward axis follows
/// the view.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewAxes {
    pub right: Vector3,
    pub back: Vector3,
}

impl ViewAxes {
    pub fn new(right: Vector3, back: Vector3) -> Self {
        Self { right, back }
    }
}

/// Point the scene is first viewed from. Steers the primary actor's first frame.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntranceView {
    pub point: Vector3,
}
