//! Attaching actors to gravity and loading the fields of a scene.
//!
//! The host owns actor lifetimes. It calls [`attach_actor`] once an actor has
//! a [`WorldPosition`] and [`detach_actor`] before dropping it; despawned
//! actors that were never detached are released by
//! [`release_detached_frames`].
//!
//! Scene fields are replaced wholesale: [`load_scene`] builds a new
//! [`FieldIndex`] from level path data and [`unload_scene`] drops every field
//! and ring at once.

use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::components::gravityflags::GravityFlags;
use crate::components::gravityframe::GravityFrame;
use crate::components::heading::Heading;
use crate::components::primaryactor::PrimaryActor;
use crate::components::worldposition::WorldPosition;
use crate::events::fieldchange::{observe_field_change, observe_primary_camera_settings};
use crate::fields::ActorKind;
use crate::resources::actorlist::{ActorRings, NodeId};
use crate::resources::camerasettings::{ActiveCameraSettings, CameraSettingsTable};
use crate::resources::driverslot::DriverSlot;
use crate::resources::fieldindex::FieldIndex;
use crate::resources::gravityconfig::GravityConfig;
use crate::resources::levelpaths::LevelPaths;
use crate::resources::viewaxes::EntranceView;
use crate::systems::behavior::{DriverContext, spawn_dependent};

/// Insert every gravity resource and register the field change observers.
pub fn init_gravity_resources(world: &mut World, config: GravityConfig) {
    world.insert_resource(config);
    world.insert_resource(FieldIndex::default());
    world.insert_resource(ActorRings::new());
    world.insert_resource(DriverSlot::default());
    world.insert_resource(CameraSettingsTable::new());
    world.insert_resource(ActiveCameraSettings::default());
    world.insert_resource(EntranceView::default());
    world.add_observer(observe_field_change);
    world.add_observer(observe_primary_camera_settings);
    world.flush();
}

/// Give `entity` a gravity frame.
///
/// The actor is placed in the field owning its position; its first basis
/// comes from [`GravityField::first_field_matrix`](crate::fields::GravityField::first_field_matrix).
/// When `driver` is set, actors flagged `can_spawn_as_sub_actor` have their
/// position read in the pivot's frame, see [`spawn_dependent`].
pub fn attach_actor(
    world: &mut World,
    entity: Entity,
    driver: Option<&mut DriverContext>,
) -> Result<NodeId, String> {
    let e = world
        .get_entity(entity)
        .map_err(|_| format!("{entity:?} does not exist"))?;
    if e.contains::<GravityFrame>() {
        return Err(format!("{entity:?} already has a gravity frame"));
    }
    let pose = *e
        .get::<WorldPosition>()
        .ok_or_else(|| format!("{entity:?} has no WorldPosition"))?;
    let flags = e.get::<GravityFlags>().copied().unwrap_or_default();
    let heading = e.get::<Heading>().copied().unwrap_or_default();
    let is_primary = e.contains::<PrimaryActor>();

    let sub_actor = flags.can_spawn_as_sub_actor && driver.is_some();
    let pos = match &driver {
        Some(ctx) if sub_actor => pose.pos.rotate_around(&ctx.pivot_point, &ctx.pivot_basis),
        _ => pose.pos,
    };

    let view_point = world
        .get_resource::<EntranceView>()
        .map_or(pos, |v| v.point);
    let kind = if is_primary {
        ActorKind::Primary { view_point }
    } else {
        ActorKind::Ordinary
    };

    world.get_resource_or_insert_with(FieldIndex::default);
    let (node, frame, camera_row) = world.resource_scope(|world, fields: Mut<FieldIndex>| {
        let field = fields.field_for(&pos, flags.always_in_default_field);
        let basis = field.first_field_matrix(&pos, kind);
        let node = world
            .get_resource_or_insert_with(ActorRings::new)
            .attach(entity, flags, field.id())?;
        let mut frame = GravityFrame::new(node, field, basis, flags, pos);
        frame.properties.capture(&pose, &heading);
        Ok::<_, String>((node, frame, field.camera_settings()))
    })?;

    if is_primary {
        select_camera_settings(world, camera_row);
    }
    world.entity_mut(entity).insert((frame, heading));
    if let Some(ctx) = driver {
        spawn_dependent(world, ctx, entity);
    }
    Ok(node)
}

fn select_camera_settings(world: &mut World, id: u8) {
    let previous = world
        .get_resource::<ActiveCameraSettings>()
        .and_then(|a| a.current);
    let Some(next) = world
        .get_resource::<CameraSettingsTable>()
        .map(|t| t.resolve(id, previous.as_ref()))
    else {
        return;
    };
    if let Some(mut active) = world.get_resource_mut::<ActiveCameraSettings>() {
        active.current = Some(next);
    }
}

/// Take `entity` out of gravity.
pub fn detach_actor(world: &mut World, entity: Entity) -> Result<(), String> {
    world
        .get_resource_mut::<ActorRings>()
        .ok_or_else(|| "gravity resources are not initialized".to_string())?
        .detach(entity)?;
    if let Ok(mut e) = world.get_entity_mut(entity) {
        e.remove::<GravityFrame>();
    }
    Ok(())
}

/// Free the ring nodes of actors whose frame disappeared without a detach,
/// e.g. because the entity was despawned.
pub fn release_detached_frames(
    mut removed: RemovedComponents<GravityFrame>,
    frames: Query<(), With<GravityFrame>>,
    mut rings: ResMut<ActorRings>,
) {
    for entity in removed.read() {
        if frames.get(entity).is_ok() || rings.node_of(entity).is_none() {
            continue;
        }
        if let Err(e) = rings.detach(entity) {
            warn!("{}", e);
        }
    }
}

/// Drop every field and ring, and the frames that referred to them.
pub fn unload_scene(world: &mut World) {
    let mut q = world.query_filtered::<Entity, With<GravityFrame>>();
    let attached: Vec<Entity> = q.iter(world).collect();
    for entity in attached {
        world.entity_mut(entity).remove::<GravityFrame>();
    }
    if let Some(mut fields) = world.get_resource_mut::<FieldIndex>() {
        fields.clear();
    }
    if let Some(mut rings) = world.get_resource_mut::<ActorRings>() {
        rings.clear();
    }
    if let Some(mut active) = world.get_resource_mut::<ActiveCameraSettings>() {
        active.current = None;
    }
}

/// Replace the scene's fields with the ones described by `level`.
pub fn load_scene(world: &mut World, level: &LevelPaths) {
    unload_scene(world);
    let fields = FieldIndex::from_level(level);
    info!(
        "Loaded scene: {} field(s), {} camera settings row(s)",
        fields.len(),
        level.camera_settings.len()
    );
    world.insert_resource(fields);
    world.insert_resource(CameraSettingsTable::from_rows(&level.camera_settings));
    if let Some(point) = level.entrance_view_point() {
        world.insert_resource(EntranceView { point });
    }
}

/// Load level path data from a JSON file and build its fields.
pub fn load_scene_from_file(
    world: &mut World,
    path: &str,
) -> Result<LevelPaths, Box<dyn std::error::Error>> {
    let level = LevelPaths::load_from_file(path)?;
    load_scene(world, &level);
    Ok(level)
}
