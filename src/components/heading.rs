//! Heading angles of an actor.
//!
//! Both angles are binary angles measured in the actor's own gravity frame:
//! zero faces the frame's forward axis and a quarter turn faces its right axis.

use bevy_ecs::prelude::Component;

use crate::math::Angle;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heading {
    /// Where the actor looks.
    pub facing: Angle,
    /// Where the actor moves.
    pub motion: Angle,
}

impl Heading {
    pub fn new(facing: Angle, motion: Angle) -> Self {
        Self { facing, motion }
    }

    /// Facing and moving the same way.
    pub fn facing(angle: Angle) -> Self {
        Self::new(angle, angle)
    }
}
