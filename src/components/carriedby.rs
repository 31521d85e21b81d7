//! Component for actors held by another actor.
//!
//! A carried actor resolves its gravity field at the holder's position, so
//! an object in someone's hands turns with the one holding it. Carried
//! actors never re-express other actors in their own frame.

use bevy_ecs::prelude::{Component, Entity};

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarriedBy {
    pub holder: Entity,
}

impl CarriedBy {
    pub fn new(holder: Entity) -> Self {
        Self { holder }
    }
}
