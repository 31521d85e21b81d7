//! Behaviors that see other actors in their own gravity frame.

use bevy_ecs::prelude::*;

use gravityframe::components::carriedby::CarriedBy;
use gravityframe::components::gravityflags::GravityFlags;
use gravityframe::components::gravityframe::GravityFrame;
use gravityframe::components::heading::Heading;
use gravityframe::components::primaryactor::PrimaryActor;
use gravityframe::components::worldposition::WorldPosition;
use gravityframe::math::{Angle, Vector3};
use gravityframe::resources::driverslot::DriverSlot;
use gravityframe::resources::gravityconfig::GravityConfig;
use gravityframe::resources::levelpaths::{
    LevelPaths, PathDescriptor, SHAPE_RADIAL_OR_AXIAL, SHAPE_TRIVIAL_CYLINDER,
};
use gravityframe::systems::attach::{attach_actor, init_gravity_resources, load_scene};
use gravityframe::systems::behavior::{redirect_delta, run_behavior};

fn scene() -> World {
    let level = LevelPaths {
        paths: vec![
            PathDescriptor::new(
                SHAPE_RADIAL_OR_AXIAL,
                1,
                vec![[0.0, 0.0, 0.0], [0.0, 100.0, 0.0]],
            ),
            PathDescriptor::new(
                SHAPE_TRIVIAL_CYLINDER,
                2,
                vec![[0.0, 200.0, 0.0], [30.0, 230.0, 0.0]],
            ),
        ],
        camera_settings: vec![],
        entrance_view: Some([0.0, 150.0, -50.0]),
    };
    let mut world = World::new();
    init_gravity_resources(&mut world, GravityConfig::new());
    load_scene(&mut world, &level);
    world
}

fn spawn(world: &mut World, pos: Vector3, flags: GravityFlags, facing: Angle) -> Entity {
    let entity = world
        .spawn((WorldPosition::new(pos), Heading::facing(facing), flags))
        .id();
    attach_actor(world, entity, None).unwrap();
    entity
}

fn spawn_primary(world: &mut World, pos: Vector3) -> Entity {
    let entity = world
        .spawn((
            WorldPosition::new(pos),
            Heading::facing(0x1000),
            PrimaryActor::new(),
        ))
        .id();
    attach_actor(world, entity, None).unwrap();
    entity
}

fn pivot_pos() -> Vector3 {
    Vector3::from_num(0.0, 50.0, 10.0)
}

fn primary_pos() -> Vector3 {
    Vector3::from_num(4.0, 52.0, 8.0)
}

fn pose(world: &World, entity: Entity) -> WorldPosition {
    *world.get::<WorldPosition>(entity).unwrap()
}

fn heading(world: &World, entity: Entity) -> Heading {
    *world.get::<Heading>(entity).unwrap()
}

fn assert_close(a: Vector3, b: Vector3, tolerance: i32) {
    let d = a - b;
    let worst = d.x.raw().abs().max(d.y.raw().abs()).max(d.z.raw().abs());
    assert!(worst <= tolerance, "{a:?} vs {b:?}: off by {worst}");
}

#[test]
fn untouched_dependent_is_restored_bit_for_bit() {
    let mut world = scene();
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let primary = spawn_primary(&mut world, primary_pos());
    let before = (pose(&world, primary), heading(&world, primary));

    let seen = run_behavior(&mut world, pivot, |world, ctx| {
        assert!(ctx.transform_others);
        assert!(!ctx.pivot_is_primary);
        assert!(ctx.is_dependent(primary));
        assert!(world.get::<GravityFrame>(primary).unwrap().properties().is_converted());
        pose(world, primary)
    })
    .unwrap();

    assert_ne!(seen.pos, before.0.pos);
    assert_eq!((pose(&world, primary), heading(&world, primary)), before);
    assert!(!world.get::<GravityFrame>(primary).unwrap().properties().is_converted());
    assert_eq!(pose(&world, pivot).pos, pivot_pos());
}

#[test]
fn moves_made_in_the_pivot_frame_come_back_rotated() {
    let mut world = scene();
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let primary = spawn_primary(&mut world, primary_pos());
    let pivot_up = world.get::<GravityFrame>(pivot).unwrap().basis().c1;
    let facing = heading(&world, primary).facing;

    run_behavior(&mut world, pivot, |world, _ctx| {
        world.get_mut::<WorldPosition>(primary).unwrap().pos += Vector3::UP;
        let mut h = world.get_mut::<Heading>(primary).unwrap();
        h.facing = h.facing.wrapping_add(0x100);
    })
    .unwrap();

    assert_close(pose(&world, primary).pos, primary_pos() + pivot_up, 128);
    assert_eq!(pose(&world, primary).prev_pos, primary_pos());
    assert_eq!(heading(&world, primary).facing, facing.wrapping_add(0x100));
}

#[test]
fn primary_pivot_converts_transforming_ring_mates() {
    let mut world = scene();
    let primary = spawn_primary(&mut world, pivot_pos());
    let mate = spawn(&mut world, primary_pos(), GravityFlags::default(), 0);
    let opted_out = spawn(
        &mut world,
        Vector3::from_num(-4.0, 52.0, 8.0),
        GravityFlags::default().with_transform(false),
        0,
    );
    let elsewhere = spawn(
        &mut world,
        Vector3::from_num(0.0, 500.0, 0.0),
        GravityFlags::default(),
        0,
    );

    run_behavior(&mut world, primary, |world, ctx| {
        assert!(ctx.pivot_is_primary);
        let dependents: Vec<Entity> = ctx.dependents().collect();
        assert_eq!(dependents, vec![mate]);
        assert!(!ctx.is_dependent(opted_out));
        assert!(!ctx.is_dependent(elsewhere));
        assert_ne!(pose(world, mate).pos, primary_pos());
        assert_eq!(pose(world, opted_out).pos, Vector3::from_num(-4.0, 52.0, 8.0));
    })
    .unwrap();

    assert_eq!(pose(&world, mate).pos, primary_pos());
}

#[test]
fn only_one_behavior_runs_at_a_time() {
    let mut world = scene();
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let other = spawn(&mut world, primary_pos(), GravityFlags::default(), 0);

    let nested = run_behavior(&mut world, pivot, |world, _ctx| {
        assert_eq!(world.resource::<DriverSlot>().current(), Some(pivot));
        run_behavior(world, other, |_, _| ()).is_err()
    })
    .unwrap();
    assert!(nested);
    assert!(!world.resource::<DriverSlot>().is_busy());

    let detached = world.spawn(WorldPosition::default()).id();
    assert!(run_behavior(&mut world, detached, |_, _| ()).is_err());
    assert!(!world.resource::<DriverSlot>().is_busy());
    assert!(run_behavior(&mut world, other, |_, _| ()).is_ok());
}

#[test]
fn pivot_in_a_trivial_field_converts_nothing() {
    let mut world = scene();
    let pivot = spawn(
        &mut world,
        Vector3::from_num(10.0, 210.0, 0.0),
        GravityFlags::default(),
        0,
    );
    let primary = spawn_primary(&mut world, primary_pos());
    let before = pose(&world, primary);

    run_behavior(&mut world, pivot, |world, ctx| {
        assert!(!ctx.transform_others);
        assert_eq!(ctx.dependents().count(), 0);
        assert_eq!(pose(world, primary), before);
    })
    .unwrap();
}

#[test]
fn carried_pivot_converts_nothing() {
    let mut world = scene();
    let holder = spawn(&mut world, primary_pos(), GravityFlags::default(), 0);
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    world.entity_mut(pivot).insert(CarriedBy::new(holder));
    let _primary = spawn_primary(&mut world, Vector3::from_num(0.0, 60.0, 0.0));

    run_behavior(&mut world, pivot, |_world, ctx| {
        assert!(!ctx.transform_others);
        assert_eq!(ctx.dependents().count(), 0);
    })
    .unwrap();
}

#[test]
fn actors_spawned_by_a_behavior_start_in_its_frame() {
    let mut world = scene();
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let local = Vector3::from_num(2.0, 53.0, 10.0);
    let expected = {
        let basis = *world.get::<GravityFrame>(pivot).unwrap().basis();
        local.rotate_around(&pivot_pos(), &basis)
    };

    let shot = run_behavior(&mut world, pivot, |world, ctx| {
        let shot = world
            .spawn((
                WorldPosition::new(local),
                Heading::facing(0x4000),
                GravityFlags::default().with_sub_actor_spawn(true),
            ))
            .id();
        attach_actor(world, shot, Some(&mut *ctx)).unwrap();
        assert!(ctx.is_dependent(shot));
        let frame = world.get::<GravityFrame>(shot).unwrap();
        assert_eq!(frame.real_position(&pose(world, shot)), expected);
        assert_eq!(frame.saved_pos(), expected);
        shot
    })
    .unwrap();

    let p = pose(&world, shot);
    assert_eq!(p.pos, expected);
    assert_eq!(p.prev_pos, expected);
    assert!(!world.get::<GravityFrame>(shot).unwrap().properties().is_converted());
}

#[test]
fn plain_spawns_inside_a_behavior_keep_world_coordinates() {
    let mut world = scene();
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let at = Vector3::from_num(1.0, 51.0, 9.0);

    let spawned = run_behavior(&mut world, pivot, |world, ctx| {
        let e = world.spawn(WorldPosition::new(at)).id();
        attach_actor(world, e, Some(&mut *ctx)).unwrap();
        assert!(!ctx.is_dependent(e));
        e
    })
    .unwrap();
    assert_eq!(pose(&world, spawned).pos, at);
}

#[test]
fn redirecting_movement_outside_a_behavior() {
    let mut world = scene();
    let actor = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let right = world.get::<GravityFrame>(actor).unwrap().basis().c0;

    world.get_mut::<WorldPosition>(actor).unwrap().pos = pivot_pos() + Vector3::X;
    assert!(redirect_delta(&mut world, None, actor));
    assert_close(pose(&world, actor).pos, pivot_pos() + right, 2);
    assert_eq!(
        world.get::<GravityFrame>(actor).unwrap().saved_pos(),
        pose(&world, actor).pos
    );

    let frozen = spawn(
        &mut world,
        primary_pos(),
        GravityFlags::default().with_transform(false),
        0,
    );
    world.get_mut::<WorldPosition>(frozen).unwrap().pos = primary_pos() + Vector3::X;
    assert!(!redirect_delta(&mut world, None, frozen));
    assert_eq!(pose(&world, frozen).pos, primary_pos() + Vector3::X);
}

#[test]
fn redirect_is_refused_for_other_actors_during_a_behavior() {
    let mut world = scene();
    let pivot = spawn(&mut world, pivot_pos(), GravityFlags::default(), 0);
    let other = spawn(&mut world, primary_pos(), GravityFlags::default(), 0);

    run_behavior(&mut world, pivot, |world, ctx| {
        assert!(!redirect_delta(world, Some(&*ctx), other));
        assert!(redirect_delta(world, Some(&*ctx), pivot));
    })
    .unwrap();
}
