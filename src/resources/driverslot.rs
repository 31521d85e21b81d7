//! Guard for the single behavior driver.
//!
//! Convert/restore only works with one pivot at a time. The slot records
//! which actor's behavior is running so a nested driver is refused instead
//! of corrupting saved properties.

use bevy_ecs::prelude::*;

#[derive(Resource, Debug, Default)]
pub struct DriverSlot {
    current: Option<Entity>,
}

impl DriverSlot {
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn claim(&mut self, entity: Entity) -> Result<(), String> {
        match self.current {
            Some(other) => Err(format!(
                "behavior of {other:?} is still running, cannot drive {entity:?}"
            )),
            None => {
                self.current = Some(entity);
                Ok(())
            }
        }
    }

    pub fn release(&mut self) {
        self.current = None;
    }
}
