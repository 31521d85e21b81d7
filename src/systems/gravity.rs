//! Per-tick gravity frame maintenance.
//!
//! [`tick_gravity`] updates one actor's [`GravityFrame`]: it resolves the
//! owning field at the actor's position (or its holder's), moves the ring
//! membership on a change, turns the up vector and rebuilds the basis, and
//! re-expresses the actor's [`Heading`] in the new basis. It runs right
//! before the actor's behavior; [`update_gravity_frames`] ticks every actor
//! for hosts that do not drive behaviors one by one.
//!
//! # Related
//!
//! - [`crate::systems::behavior::run_behavior`] – ticks the pivot before its behavior
//! - [`crate::events::fieldchange::FieldChangedEvent`] – emitted on owner changes

use bevy_ecs::prelude::*;
use log::warn;

use crate::components::carriedby::CarriedBy;
use crate::components::gravityframe::{FrameInput, FrameUpdate, GravityFrame, Steering};
use crate::components::heading::Heading;
use crate::components::primaryactor::PrimaryActor;
use crate::components::worldposition::WorldPosition;
use crate::events::fieldchange::FieldChangedEvent;
use crate::math::Fix12;
use crate::resources::actorlist::ActorRings;
use crate::resources::camerasettings::{
    ActiveCameraSettings, CameraSettings, CameraSettingsTable,
};
use crate::resources::fieldindex::FieldIndex;
use crate::resources::gravityconfig::{GravityConfig, OrientationTuning};
use crate::resources::viewaxes::ViewAxes;

/// Tuning from the [`GravityConfig`] resource, or the defaults.
pub fn orientation_tuning(world: &World) -> OrientationTuning {
    world
        .get_resource::<GravityConfig>()
        .map(GravityConfig::tuning)
        .unwrap_or_default()
}

/// The primary actor, if one is attached.
pub fn primary_entity(world: &mut World) -> Option<Entity> {
    let mut q = world.query_filtered::<Entity, (With<PrimaryActor>, With<GravityFrame>)>();
    q.iter(world).next()
}

/// Build the frame input of `entity` from its components and the view.
fn frame_input(world: &World, entity: Entity) -> Result<FrameInput, String> {
    let e = world
        .get_entity(entity)
        .map_err(|_| format!("{entity:?} does not exist"))?;
    let pose = e
        .get::<WorldPosition>()
        .ok_or_else(|| format!("{entity:?} has no WorldPosition"))?;

    let mut input = FrameInput::at(pose.pos);
    if let Some(carried) = e.get::<CarriedBy>()
        && let Some(holder) = world.get::<WorldPosition>(carried.holder)
    {
        input = input.with_anchor(holder.pos);
    }
    if let Some(primary) = e.get::<PrimaryActor>()
        && !primary.first_person
        && let Some(view) = world.get_resource::<ViewAxes>()
    {
        input = input.with_steering(Steering::View(*view));
    }
    Ok(input)
}

/// Update the gravity frame of `entity` for this tick.
///
/// Returns what changed. Errors when the entity is not attached or lacks a
/// position; the frame is then left untouched.
pub fn tick_gravity(world: &mut World, entity: Entity) -> Result<FrameUpdate, String> {
    let input = frame_input(world, entity)?;
    let tuning = orientation_tuning(world);
    if !world.contains_resource::<FieldIndex>() || !world.contains_resource::<ActorRings>() {
        return Err("gravity resources are not initialized".to_string());
    }

    let outcome = world.resource_scope(|world, fields: Mut<FieldIndex>| {
        world.resource_scope(|world, mut rings: Mut<ActorRings>| {
            let mut q = world.query::<(&mut GravityFrame, Option<&mut Heading>)>();
            let (mut frame, heading) = q
                .get_mut(world, entity)
                .map_err(|_| format!("{entity:?} is not attached to gravity"))?;
            let mut scratch = Heading::default();
            let heading = match heading {
                Some(h) => h.into_inner(),
                None => &mut scratch,
            };
            Ok::<_, String>(frame.update(&input, heading, &fields, &mut rings, &tuning))
        })
    })?;

    if let Some((from, to)) = outcome.field_change {
        world.trigger(FieldChangedEvent { entity, from, to });
    }
    Ok(outcome)
}

/// Tick every attached actor once.
pub fn update_gravity_frames(world: &mut World) {
    let mut q = world.query_filtered::<Entity, With<GravityFrame>>();
    let entities: Vec<Entity> = q.iter(world).collect();
    for entity in entities {
        if let Err(e) = tick_gravity(world, entity) {
            warn!("gravity update skipped: {}", e);
        }
    }
}

/// The primary actor's frame is the world frame. True when there is no
/// primary actor.
pub fn is_primary_in_trivial_field(world: &mut World) -> bool {
    let mut q = world.query_filtered::<&GravityFrame, With<PrimaryActor>>();
    q.iter(world).next().is_none_or(|f| f.is_in_trivial_field())
}

/// Camera settings for the primary actor's current field.
pub fn primary_camera_settings(world: &mut World) -> CameraSettings {
    let mut q = world.query_filtered::<&GravityFrame, With<PrimaryActor>>();
    let Some(field) = q.iter(world).next().map(GravityFrame::field) else {
        return CameraSettings::DEFAULT;
    };
    let id = world
        .get_resource::<FieldIndex>()
        .map_or(0, |f| f.field(field).camera_settings());
    let previous = world
        .get_resource::<ActiveCameraSettings>()
        .and_then(|a| a.current);
    world
        .get_resource::<CameraSettingsTable>()
        .map_or(previous.unwrap_or(CameraSettings::DEFAULT), |t| {
            t.resolve(id, previous.as_ref())
        })
}

/// Vertical acceleration that keeps an airborne actor following a curved
/// surface at `horz_speed`, see [`GravityFrame::curvature_acceleration`].
pub fn curvature_acceleration(world: &World, entity: Entity, horz_speed: Fix12) -> Fix12 {
    let (Some(frame), Some(fields)) = (
        world.get::<GravityFrame>(entity),
        world.get_resource::<FieldIndex>(),
    ) else {
        return Fix12::ZERO;
    };
    let motion = world.get::<Heading>(entity).map_or(0, |h| h.motion);
    frame.curvature_acceleration(horz_speed, motion, fields, &orientation_tuning(world))
}
