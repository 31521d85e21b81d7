//! Per-actor switches for how the gravity frame treats an actor.

use bevy_ecs::prelude::Component;

/// Read once when the actor is attached.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GravityFlags {
    /// Never leave the default field; the frame stays the world frame.
    pub always_in_default_field: bool,
    /// Take part in convert/restore, both as a pivot and as a dependent.
    pub should_transform: bool,
    /// When spawned by another actor's behavior, treat the spawn position as
    /// expressed in that actor's frame.
    pub can_spawn_as_sub_actor: bool,
}

impl Default for GravityFlags {
    fn default() -> Self {
        Self {
            always_in_default_field: false,
            should_transform: true,
            can_spawn_as_sub_actor: false,
        }
    }
}

impl GravityFlags {
    /// Flags for an actor that ignores authored fields.
    pub fn pinned_to_default() -> Self {
        Self {
            always_in_default_field: true,
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, should_transform: bool) -> Self {
        self.should_transform = should_transform;
        self
    }

    pub fn with_sub_actor_spawn(mut self, can_spawn: bool) -> Self {
        self.can_spawn_as_sub_actor = can_spawn;
        self
    }
}
