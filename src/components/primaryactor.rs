//! Marker for the player-controlled actor.
//!
//! There is at most one primary actor. Its forward axis follows the view
//! instead of its previous orientation, and it is the actor that other
//! actors' behaviors see re-expressed in their frames.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimaryActor {
    /// The view is attached to the actor's eyes; forward then follows the
    /// actor's own frame instead of the view.
    pub first_person: bool,
}

impl PrimaryActor {
    pub fn new() -> Self {
        Self {
            first_person: false,
        }
    }

    pub fn with_first_person(mut self, first_person: bool) -> Self {
        self.first_person = first_person;
        self
    }
}
