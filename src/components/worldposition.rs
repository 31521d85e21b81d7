use bevy_ecs::prelude::Component;

use crate::math::Vector3;

/// Where an actor is this tick and where it was the tick before.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldPosition {
    pub pos: Vector3,
    pub prev_pos: Vector3,
}

impl WorldPosition {
    pub fn new(pos: Vector3) -> Self {
        Self { pos, prev_pos: pos }
    }

    /// Move to `pos`, remembering the current position as the previous one.
    pub fn step_to(&mut self, pos: Vector3) {
        self.prev_pos = self.pos;
        self.pos = pos;
    }
}
