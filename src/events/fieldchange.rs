//! Gravity field change notifications.
//!
//! [`tick_gravity`](crate::systems::gravity::tick_gravity) triggers a
//! [`FieldChangedEvent`] whenever an actor's owning field changes. Two
//! observers are provided:
//!
//! - [`observe_field_change`] logs the change;
//! - [`observe_primary_camera_settings`] switches the active camera settings
//!   row when the primary actor enters a new field.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<FieldChangedEvent>| {
//!     println!("{:?} now in {:?}", trigger.event().entity, trigger.event().to);
//! });
//! ```

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::primaryactor::PrimaryActor;
use crate::fields::FieldId;
use crate::resources::camerasettings::{ActiveCameraSettings, CameraSettingsTable};
use crate::resources::fieldindex::FieldIndex;

/// An actor moved from one gravity field to another.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChangedEvent {
    pub entity: Entity,
    pub from: FieldId,
    pub to: FieldId,
}

pub fn observe_field_change(trigger: On<FieldChangedEvent>, fields: Option<Res<FieldIndex>>) {
    let event = trigger.event();
    let shape = fields
        .as_deref()
        .and_then(|f| f.get(event.to))
        .map_or("unknown", |f| f.shape().name());
    debug!(
        "{:?} changed gravity field {:?} -> {:?} ({})",
        event.entity, event.from, event.to, shape
    );
}

/// Pick the camera settings row of the primary actor's new field.
pub fn observe_primary_camera_settings(
    trigger: On<FieldChangedEvent>,
    primary: Query<(), With<PrimaryActor>>,
    fields: Option<Res<FieldIndex>>,
    table: Option<Res<CameraSettingsTable>>,
    active: Option<ResMut<ActiveCameraSettings>>,
) {
    let event = trigger.event();
    if primary.get(event.entity).is_err() {
        return;
    }
    let (Some(fields), Some(table), Some(mut active)) = (fields, table, active) else {
        return;
    };
    let id = fields.field(event.to).camera_settings();
    let settings = active.select(&table, id);
    debug!("camera settings row {} -> {:?}", id, settings.values);
}
