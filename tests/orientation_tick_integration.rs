//! Frame updates driven through the world: transitions, carried actors,
//! view steering and ring bookkeeping.

use bevy_ecs::prelude::*;

use gravityframe::components::carriedby::CarriedBy;
use gravityframe::components::gravityflags::GravityFlags;
use gravityframe::components::gravityframe::{FrameState, GravityFrame};
use gravityframe::components::heading::Heading;
use gravityframe::components::primaryactor::PrimaryActor;
use gravityframe::components::worldposition::WorldPosition;
use gravityframe::fields::FieldId;
use gravityframe::math::{Fix12, Vector3};
use gravityframe::resources::actorlist::ActorRings;
use gravityframe::resources::gravityconfig::GravityConfig;
use gravityframe::resources::levelpaths::{
    LevelPaths, PathDescriptor, SHAPE_HOMOGENEOUS_CYLINDER, SHAPE_RADIAL_OR_AXIAL,
    SHAPE_TRIVIAL_CYLINDER,
};
use gravityframe::resources::viewaxes::ViewAxes;
use gravityframe::systems::attach::{
    attach_actor, detach_actor, init_gravity_resources, load_scene, release_detached_frames,
};
use gravityframe::systems::gravity::{
    curvature_acceleration, is_primary_in_trivial_field, tick_gravity, update_gravity_frames,
};

const PLATFORM: FieldId = FieldId(1);
const PLANET: FieldId = FieldId(2);
const WALL: FieldId = FieldId(3);

fn level() -> LevelPaths {
    LevelPaths {
        paths: vec![
            PathDescriptor::new(
                SHAPE_RADIAL_OR_AXIAL,
                1,
                vec![[0.0, 0.0, 0.0], [0.0, 50.0, 0.0]],
            ),
            PathDescriptor::new(
                SHAPE_HOMOGENEOUS_CYLINDER,
                1,
                vec![[0.0, -60.0, 0.0], [0.0, -80.0, 0.0], [20.0, -60.0, 0.0]],
            ),
            PathDescriptor::new(
                SHAPE_TRIVIAL_CYLINDER,
                2,
                vec![[0.0, 100.0, 0.0], [30.0, 130.0, 0.0]],
            ),
        ],
        camera_settings: vec![],
        entrance_view: None,
    }
}

fn scene() -> World {
    let mut world = World::new();
    init_gravity_resources(&mut world, GravityConfig::new());
    load_scene(&mut world, &level());
    world
}

fn spawn_at(world: &mut World, x: f64, y: f64, z: f64) -> Entity {
    let entity = world
        .spawn((
            WorldPosition::new(Vector3::from_num(x, y, z)),
            Heading::default(),
            GravityFlags::default(),
        ))
        .id();
    attach_actor(world, entity, None).unwrap();
    entity
}

fn move_to(world: &mut World, entity: Entity, x: f64, y: f64, z: f64) {
    world
        .get_mut::<WorldPosition>(entity)
        .unwrap()
        .step_to(Vector3::from_num(x, y, z));
}

fn frame(world: &World, entity: Entity) -> &GravityFrame {
    world.get::<GravityFrame>(entity).unwrap()
}

#[test]
fn entering_the_planet_turns_then_settles() {
    let mut world = scene();
    let actor = spawn_at(&mut world, 0.0, 200.0, 0.0);
    assert_eq!(frame(&world, actor).state(), FrameState::Identity);

    move_to(&mut world, actor, 1.0, -30.0, 0.0);
    let out = tick_gravity(&mut world, actor).unwrap();
    assert_eq!(out.field_change, Some((FieldId::DEFAULT, PLANET)));
    assert!(out.reoriented());
    assert_eq!(frame(&world, actor).state(), FrameState::Transitioning);
    assert_eq!(
        world.resource::<ActorRings>().field_of(frame(&world, actor).node()),
        Some(PLANET)
    );

    let mut ticks = 1;
    while frame(&world, actor).is_transitioning() && ticks < 1000 {
        let out = tick_gravity(&mut world, actor).unwrap();
        assert!(out.field_change.is_none());
        assert!(frame(&world, actor).basis().is_orthonormal());
        ticks += 1;
    }
    assert!(ticks > 2);
    let f = frame(&world, actor);
    assert_eq!(f.state(), FrameState::Steady);
    assert!(f.up_vector().y.is_negative());

    // Settled and not moving: nothing to do.
    let out = tick_gravity(&mut world, actor).unwrap();
    assert!(!out.reoriented());
}

#[test]
fn steady_homogeneous_owner_is_left_alone() {
    let mut world = scene();
    let actor = spawn_at(&mut world, 0.0, -70.0, 0.0);
    assert_eq!(frame(&world, actor).field(), WALL);
    assert_eq!(frame(&world, actor).up_vector(), -Vector3::UP);
    let basis = *frame(&world, actor).basis();

    move_to(&mut world, actor, 5.0, -70.0, 5.0);
    let out = tick_gravity(&mut world, actor).unwrap();
    assert!(out.field_change.is_none());
    assert!(!out.reoriented());
    assert_eq!(*frame(&world, actor).basis(), basis);
    assert_eq!(
        frame(&world, actor).last_update_point(),
        Vector3::from_num(5.0, -70.0, 5.0)
    );
}

#[test]
fn trivial_owner_gives_the_world_frame_at_once() {
    let mut world = scene();
    let actor = spawn_at(&mut world, 0.0, 45.0, 0.0);
    assert_eq!(frame(&world, actor).field(), PLANET);

    move_to(&mut world, actor, 10.0, 115.0, 0.0);
    let out = tick_gravity(&mut world, actor).unwrap();
    assert_eq!(out.field_change, Some((PLANET, PLATFORM)));
    let f = frame(&world, actor);
    assert_eq!(f.state(), FrameState::Identity);
    assert!(f.basis().is_identity());
    assert_eq!(f.remaining_turn(), 0);
}

#[test]
fn carried_actor_follows_its_holder() {
    let mut world = scene();
    let holder = spawn_at(&mut world, 0.0, 20.0, 0.0);
    let carried = spawn_at(&mut world, 0.0, 200.0, 0.0);
    world.entity_mut(carried).insert(CarriedBy::new(holder));
    assert_eq!(frame(&world, carried).field(), FieldId::DEFAULT);

    move_to(&mut world, carried, 0.0, 202.0, 0.0);
    let out = tick_gravity(&mut world, carried).unwrap();
    assert_eq!(out.field_change, Some((FieldId::DEFAULT, PLANET)));
    assert_eq!(frame(&world, carried).field(), PLANET);
}

#[test]
fn primary_forward_follows_the_view() {
    let mut world = scene();
    world.insert_resource(ViewAxes::new(Vector3::X, Vector3::Z));
    let primary = world
        .spawn((
            WorldPosition::new(Vector3::from_num(30.0, 30.0, 0.0)),
            Heading::default(),
            PrimaryActor::new(),
        ))
        .id();
    attach_actor(&mut world, primary, None).unwrap();
    assert!(!is_primary_in_trivial_field(&mut world));

    let mut x = 30.0;
    for _ in 0..20 {
        x += 1.5;
        move_to(&mut world, primary, x, 30.0, 0.0);
        tick_gravity(&mut world, primary).unwrap();
        let f = frame(&world, primary);
        assert!(f.basis().is_orthonormal());
        // With the view along z, forward tilts out of the view plane by as
        // much as up tilts away from the world y axis.
        assert!((f.basis().c2.z - f.basis().c1.y).abs() <= Fix12::from_raw(32));
        assert!(f.basis().c2.z < Fix12::from_num(0.8));
    }
}

#[test]
fn pinned_actor_stays_in_the_default_field() {
    let mut world = scene();
    let actor = world
        .spawn((
            WorldPosition::new(Vector3::from_num(0.0, 20.0, 0.0)),
            GravityFlags::pinned_to_default(),
        ))
        .id();
    attach_actor(&mut world, actor, None).unwrap();
    assert_eq!(frame(&world, actor).field(), FieldId::DEFAULT);

    move_to(&mut world, actor, 0.0, 30.0, 0.0);
    let out = tick_gravity(&mut world, actor).unwrap();
    assert!(out.field_change.is_none());
    assert!(frame(&world, actor).basis().is_identity());
    assert_eq!(
        world.resource::<ActorRings>().len(FieldId::DEFAULT),
        1
    );
}

#[test]
fn primary_trivial_field_query() {
    let mut world = scene();
    assert!(is_primary_in_trivial_field(&mut world));

    let primary = world
        .spawn((
            WorldPosition::new(Vector3::from_num(10.0, 115.0, 0.0)),
            PrimaryActor::new().with_first_person(true),
        ))
        .id();
    attach_actor(&mut world, primary, None).unwrap();
    assert!(is_primary_in_trivial_field(&mut world));

    move_to(&mut world, primary, 0.0, 45.0, 0.0);
    tick_gravity(&mut world, primary).unwrap();
    assert!(!is_primary_in_trivial_field(&mut world));
}

#[test]
fn update_all_frames_at_once() {
    let mut world = scene();
    let a = spawn_at(&mut world, 0.0, 45.0, 0.0);
    let b = spawn_at(&mut world, 0.0, 200.0, 0.0);
    move_to(&mut world, a, 3.0, 45.0, 0.0);
    move_to(&mut world, b, 0.0, 40.0, 0.0);

    update_gravity_frames(&mut world);
    assert_eq!(
        frame(&world, a).last_update_point(),
        Vector3::from_num(3.0, 45.0, 0.0)
    );
    assert_eq!(frame(&world, b).field(), PLANET);
    assert_eq!(world.resource::<ActorRings>().len(PLANET), 2);
}

#[test]
fn airborne_actor_curves_with_the_planet() {
    let mut world = scene();
    let actor = spawn_at(&mut world, 0.0, 45.0, 0.0);
    let planet = curvature_acceleration(&world, actor, Fix12::from_int(2));
    assert!(planet > Fix12::ZERO);
    assert!(planet < Fix12::ONE);

    let flat = spawn_at(&mut world, 10.0, 115.0, 0.0);
    assert!(curvature_acceleration(&world, flat, Fix12::from_int(2)).abs() <= Fix12::from_raw(2));
}

#[test]
fn despawned_actors_release_their_nodes() {
    let mut world = scene();
    let mut cleanup = Schedule::default();
    cleanup.add_systems(release_detached_frames);
    cleanup.run(&mut world);

    let a = spawn_at(&mut world, 0.0, 45.0, 0.0);
    let b = spawn_at(&mut world, 0.0, 40.0, 0.0);
    let c = spawn_at(&mut world, 0.0, 35.0, 0.0);
    assert_eq!(world.resource::<ActorRings>().attached(), 3);

    detach_actor(&mut world, c).unwrap();
    assert!(world.get::<GravityFrame>(c).is_none());
    assert_eq!(world.resource::<ActorRings>().attached(), 2);
    assert!(detach_actor(&mut world, c).is_err());

    world.despawn(a);
    cleanup.run(&mut world);
    let rings = world.resource::<ActorRings>();
    assert_eq!(rings.attached(), 1);
    assert!(rings.node_of(a).is_none());
    assert!(rings.node_of(b).is_some());
    assert_eq!(rings.len(PLANET), 1);
}
