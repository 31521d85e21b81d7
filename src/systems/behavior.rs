//! Running an actor's behavior inside its own gravity frame.
//!
//! Behaviors are written as if gravity pointed down the world y axis. To let
//! them work unchanged on a planet, [`run_behavior`] wraps the behavior of a
//! *pivot* actor:
//!
//! 1. tick the pivot's gravity frame;
//! 2. if the pivot transforms others, redirect its movement delta into its
//!    frame and convert the dependents into the pivot's frame;
//! 3. run the behavior;
//! 4. redirect again and restore the dependents.
//!
//! For an ordinary pivot the only dependent is the primary actor. For the
//! primary actor every ring-mate that takes part in conversion is one. The
//! conversion used for a dependent is captured once and reused for its
//! restore, so the behavior cannot desynchronize the two passes.
//!
//! Only one behavior may run at a time; the [`DriverSlot`] resource refuses
//! nested drivers.

use bevy_ecs::prelude::*;
use log::warn;
use smallvec::SmallVec;

use crate::components::carriedby::CarriedBy;
use crate::components::frameproperties::FrameConversion;
use crate::components::gravityframe::GravityFrame;
use crate::components::heading::Heading;
use crate::components::primaryactor::PrimaryActor;
use crate::components::worldposition::WorldPosition;
use crate::math::{Matrix3x3, Vector3};
use crate::resources::actorlist::ActorRings;
use crate::resources::driverslot::DriverSlot;
use crate::systems::gravity::{primary_entity, tick_gravity};

/// The pivot of a running behavior and what it converted.
#[derive(Debug, Clone)]
pub struct DriverContext {
    pub pivot: Entity,
    /// The pivot's previous position. Dependents rotate around it.
    pub pivot_point: Vector3,
    pub pivot_basis: Matrix3x3,
    /// The pivot re-expresses other actors in its frame.
    pub transform_others: bool,
    pub pivot_is_primary: bool,
    dependents: SmallVec<[(Entity, FrameConversion); 8]>,
}

impl DriverContext {
    /// Dependents currently expressed in the pivot's frame.
    pub fn dependents(&self) -> impl Iterator<Item = Entity> + '_ {
        self.dependents.iter().map(|(e, _)| *e)
    }

    pub fn is_dependent(&self, entity: Entity) -> bool {
        self.dependents.iter().any(|(e, _)| *e == entity)
    }

    /// How values of an actor with basis `own_basis` move into this pivot's frame.
    pub fn conversion_for(&self, own_basis: &Matrix3x3) -> FrameConversion {
        FrameConversion::new(*own_basis, self.pivot_basis, self.pivot_point)
    }
}

/// Run `f` as the behavior of `entity`.
///
/// Errors when another behavior is already running or `entity` is not
/// attached to gravity; `f` is then not called.
pub fn run_behavior<R>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut World, &mut DriverContext) -> R,
) -> Result<R, String> {
    world
        .get_resource_or_insert_with(DriverSlot::default)
        .claim(entity)?;

    let mut ctx = match before_behavior(world, entity) {
        Ok(ctx) => ctx,
        Err(e) => {
            world.resource_mut::<DriverSlot>().release();
            return Err(e);
        }
    };

    let result = f(world, &mut ctx);

    after_behavior(world, &ctx);
    world.resource_mut::<DriverSlot>().release();
    Ok(result)
}

fn before_behavior(world: &mut World, entity: Entity) -> Result<DriverContext, String> {
    tick_gravity(world, entity)?;

    let e = world
        .get_entity(entity)
        .map_err(|_| format!("{entity:?} does not exist"))?;
    let frame = e
        .get::<GravityFrame>()
        .ok_or_else(|| format!("{entity:?} is not attached to gravity"))?;
    let pivot_point = e.get::<WorldPosition>().map_or(Vector3::ZERO, |p| p.prev_pos);
    let transform_others = frame.flags().should_transform
        && !frame.is_in_trivial_field()
        && !e.contains::<CarriedBy>();
    let node = frame.node();

    let mut ctx = DriverContext {
        pivot: entity,
        pivot_point,
        pivot_basis: *frame.basis(),
        transform_others,
        pivot_is_primary: e.contains::<PrimaryActor>(),
        dependents: SmallVec::new(),
    };
    if !ctx.transform_others {
        return Ok(ctx);
    }

    redirect_own_delta(world, entity);

    let candidates: SmallVec<[Entity; 8]> = if ctx.pivot_is_primary {
        world
            .get_resource::<ActorRings>()
            .map(|rings| {
                rings
                    .others(node)
                    .filter(|m| m.flags.should_transform)
                    .map(|m| m.entity)
                    .collect()
            })
            .unwrap_or_default()
    } else {
        primary_entity(world).into_iter().collect()
    };

    for dependent in candidates {
        convert_dependent(world, &mut ctx, dependent);
    }
    Ok(ctx)
}

fn after_behavior(world: &mut World, ctx: &DriverContext) {
    if !ctx.transform_others {
        return;
    }
    redirect_own_delta(world, ctx.pivot);
    for (dependent, conv) in &ctx.dependents {
        restore_dependent(world, *dependent, conv);
    }
}

/// Express `dependent` in the pivot's frame until the behavior ends.
fn convert_dependent(world: &mut World, ctx: &mut DriverContext, dependent: Entity) {
    let mut q = world.query::<(&mut GravityFrame, &mut WorldPosition, &mut Heading)>();
    let Ok((mut frame, mut pose, mut heading)) = q.get_mut(world, dependent) else {
        warn!("{:?} cannot be converted: missing frame, position or heading", dependent);
        return;
    };
    if frame.properties.is_converted() {
        warn!("{:?} is already converted", dependent);
        return;
    }
    let conv = ctx.conversion_for(frame.basis());
    frame.properties.convert(&mut pose, &mut heading, &conv);
    ctx.dependents.push((dependent, conv));
}

fn restore_dependent(world: &mut World, dependent: Entity, conv: &FrameConversion) {
    let mut q = world.query::<(&mut GravityFrame, &mut WorldPosition, &mut Heading)>();
    // Dependents despawned by the behavior need no restore.
    if let Ok((mut frame, mut pose, mut heading)) = q.get_mut(world, dependent) {
        frame.properties.restore(&mut pose, &mut heading, conv);
    }
}

/// Register a freshly attached actor as spawned by the running behavior.
///
/// Its position and heading are taken as expressed in the pivot's frame:
/// the real values are derived with the inverse conversion and the actor is
/// restored with the other dependents once the behavior ends. Actors that
/// cannot spawn as sub-actors only get their properties captured.
pub fn spawn_dependent(world: &mut World, ctx: &mut DriverContext, entity: Entity) -> bool {
    let mut q = world.query::<(&mut GravityFrame, &WorldPosition, Option<&Heading>)>();
    let Ok((mut frame, pose, heading)) = q.get_mut(world, entity) else {
        return false;
    };
    let heading = heading.copied().unwrap_or_default();
    if !frame.flags().can_spawn_as_sub_actor || entity == ctx.pivot {
        frame.properties.capture(pose, &heading);
        return false;
    }
    let conv = ctx.conversion_for(frame.basis());
    frame.properties.initialize(pose, &heading, &conv);
    let real = frame.properties.real_pose(pose).pos;
    frame.resync_anchor(real);
    ctx.dependents.push((entity, conv));
    true
}

fn redirect_own_delta(world: &mut World, entity: Entity) {
    let mut q = world.query::<(&mut GravityFrame, &mut WorldPosition)>();
    if let Ok((mut frame, mut pose)) = q.get_mut(world, entity) {
        frame.redirect_delta(&mut pose.pos);
    }
}

/// Redirect the movement of `entity` into its frame.
///
/// For actors whose position is changed outside their own behavior. Does
/// nothing while another actor's behavior runs, or for actors that do not
/// take part in conversion. Returns whether the position was redirected.
pub fn redirect_delta(world: &mut World, driver: Option<&DriverContext>, entity: Entity) -> bool {
    if driver.is_some_and(|d| d.pivot != entity) {
        return false;
    }
    let mut q = world.query::<(&mut GravityFrame, &mut WorldPosition)>();
    let Ok((mut frame, mut pose)) = q.get_mut(world, entity) else {
        return false;
    };
    if !frame.flags().should_transform {
        return false;
    }
    frame.redirect_delta(&mut pose.pos);
    true
}
