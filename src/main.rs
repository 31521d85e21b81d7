//! Gravity frame demo.
//!
//! Loads a level's gravity paths, drops a primary actor and a handful of
//! wandering actors into it, and runs their behaviors for a number of ticks
//! while logging field changes. With `--probe` it only reports which field
//! owns a point.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --level levels/planets.json --ticks 600
//! cargo run -- --probe 0,40,0
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use gravityframe::components::gravityflags::GravityFlags;
use gravityframe::components::gravityframe::GravityFrame;
use gravityframe::components::heading::Heading;
use gravityframe::components::primaryactor::PrimaryActor;
use gravityframe::components::worldposition::WorldPosition;
use gravityframe::math::basis::heading_direction;
use gravityframe::math::trig::{ONE_DEGREE, angle_to_degrees};
use gravityframe::math::vector::angle_between_degrees;
use gravityframe::math::{Angle, Fix12, Matrix3x3, Vector3};
use gravityframe::resources::fieldindex::FieldIndex;
use gravityframe::resources::gravityconfig::GravityConfig;
use gravityframe::resources::levelpaths::{
    LevelPaths, PathDescriptor, SHAPE_HOMOGENEOUS_CYLINDER, SHAPE_RADIAL_OR_AXIAL,
    SHAPE_TRIVIAL_CYLINDER,
};
use gravityframe::resources::viewaxes::ViewAxes;
use gravityframe::systems::attach::{
    attach_actor, init_gravity_resources, load_scene, load_scene_from_file,
    release_detached_frames,
};
use gravityframe::systems::behavior::run_behavior;
use gravityframe::systems::gravity::{is_primary_in_trivial_field, primary_camera_settings};

/// Gravity frame demo
#[derive(Parser)]
#[command(version, about = "Runs actors across overlapping gravity fields.")]
struct Cli {
    /// Level JSON with gravity paths. Defaults to the config's level, then a built-in scene.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./gravity.ini")]
    config: PathBuf,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 240)]
    ticks: u32,

    /// Number of wandering actors.
    #[arg(long, default_value_t = 8)]
    actors: u32,

    /// Seed for actor placement.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Report the field owning X,Y,Z and exit.
    #[arg(long, value_name = "X,Y,Z", value_delimiter = ',', num_args = 3)]
    probe: Option<Vec<f64>>,
}

/// A planet, a pillar standing on it and a flat platform above them.
fn builtin_level() -> LevelPaths {
    LevelPaths {
        paths: vec![
            PathDescriptor::new(
                SHAPE_RADIAL_OR_AXIAL,
                1,
                vec![[0.0, 0.0, 0.0], [0.0, 60.0, 0.0]],
            ),
            PathDescriptor::new(
                SHAPE_RADIAL_OR_AXIAL,
                2,
                vec![[40.0, 0.0, 0.0], [80.0, 0.0, 0.0], [80.0, 10.0, 0.0]],
            )
            .with_camera_settings(1),
            PathDescriptor::new(
                SHAPE_HOMOGENEOUS_CYLINDER,
                1,
                vec![[0.0, -70.0, 0.0], [0.0, -90.0, 0.0], [25.0, -70.0, 0.0]],
            ),
            PathDescriptor::new(
                SHAPE_TRIVIAL_CYLINDER,
                3,
                vec![[0.0, 100.0, 0.0], [30.0, 130.0, 0.0]],
            ),
        ],
        camera_settings: vec![
            [1000, 250, 1000, 250, 0, 30, 24, 0],
            [700, 200, 700, 200, 0, 25, 20, 0],
        ],
        entrance_view: Some([0.0, 40.0, -120.0]),
    }
}

fn probe(world: &World, p: &[f64]) {
    let pos = Vector3::from_num(p[0], p[1], p[2]);
    let fields = world.resource::<FieldIndex>();
    let field = fields.field_at(&pos);
    let up = field.up_vector(&pos);
    println!(
        "{:?} -> field {:?} ({}, priority {}), altitude {}, up {:?}, {:.1} deg from world up",
        p,
        field.id(),
        field.shape().name(),
        field.priority(),
        field.altitude(&pos),
        up.to_f64(),
        angle_between_degrees(&up, &Vector3::UP)
    );
}

/// Step along the actor's facing. Movement of a redirected actor is written
/// in flat coordinates and turned into its frame afterwards; other actors
/// move along their basis directly.
fn walk(world: &mut World, entity: Entity, speed: Fix12, redirected: bool) {
    let basis = match world.get::<GravityFrame>(entity) {
        Some(_) if redirected => Matrix3x3::IDENTITY,
        Some(frame) => *frame.basis(),
        None => return,
    };
    let facing = world.get::<Heading>(entity).map_or(0, |h| h.facing);
    if let Some(mut pose) = world.get_mut::<WorldPosition>(entity) {
        let next = pose.pos + heading_direction(facing, &basis) * speed;
        pose.step_to(next);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GravityConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    let level_path = cli.level.clone().or_else(|| config.level_path.clone());

    let mut world = World::new();
    init_gravity_resources(&mut world, config);
    world.insert_resource(ViewAxes::new(Vector3::X, Vector3::Z));

    match level_path {
        Some(path) => {
            if let Err(e) = load_scene_from_file(&mut world, &path.display().to_string()) {
                log::error!("Failed to load level {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => {
            info!("No level given, using the built-in scene");
            load_scene(&mut world, &builtin_level());
        }
    }

    if let Some(p) = cli.probe {
        probe(&world, &p);
        return;
    }

    let mut rng = fastrand::Rng::with_seed(cli.seed);

    let primary = world
        .spawn((
            WorldPosition::new(Vector3::from_num(0.0, 62.0, 0.0)),
            Heading::default(),
            PrimaryActor::new(),
            GravityFlags::default(),
        ))
        .id();
    if let Err(e) = attach_actor(&mut world, primary, None) {
        log::error!("{}", e);
        std::process::exit(1);
    }

    let mut actors = vec![primary];
    for _ in 0..cli.actors {
        let dir = Vector3::from_num(rng.f64() - 0.5, rng.f64() - 0.5, rng.f64() - 0.5);
        let pos = dir.normalized() * Fix12::from_num(55.0 + rng.f64() * 10.0);
        let facing = rng.i16(..);
        let entity = world
            .spawn((
                WorldPosition::new(pos),
                Heading::facing(facing),
                GravityFlags::default().with_transform(rng.bool()),
            ))
            .id();
        match attach_actor(&mut world, entity, None) {
            Ok(_) => actors.push(entity),
            Err(e) => warn!("{}", e),
        }
    }

    let mut cleanup = Schedule::default();
    cleanup.add_systems(release_detached_frames);

    let speed = Fix12::from_num(1.5);
    for tick in 0..cli.ticks {
        for &entity in &actors {
            let turn = (rng.i32(-3..=3) * ONE_DEGREE) as Angle;
            let is_primary = entity == primary;
            let result = run_behavior(&mut world, entity, |world, ctx| {
                if !is_primary && let Some(mut h) = world.get_mut::<Heading>(entity) {
                    h.facing = h.facing.wrapping_add(turn);
                    h.motion = h.facing;
                }
                walk(world, entity, speed, ctx.transform_others);
            });
            if let Err(e) = result {
                warn!("{}", e);
            }
        }
        cleanup.run(&mut world);
        world.clear_trackers();

        if tick % 60 == 0 {
            info!(
                "tick {}: primary in trivial field: {}, camera distance {}",
                tick,
                is_primary_in_trivial_field(&mut world),
                primary_camera_settings(&mut world).max_distance()
            );
        }
    }

    for &entity in &actors {
        let (Some(frame), Some(pose), Some(heading)) = (
            world.get::<GravityFrame>(entity),
            world.get::<WorldPosition>(entity),
            world.get::<Heading>(entity),
        ) else {
            continue;
        };
        println!(
            "{:?}: field {:?} {:?}, pos {:?}, facing {:.1} deg, {:.1} deg from world up",
            entity,
            frame.field(),
            frame.state(),
            pose.pos.to_f64(),
            angle_to_degrees(heading.facing as i32),
            angle_between_degrees(&frame.up_vector(), &Vector3::UP)
        );
    }
}
