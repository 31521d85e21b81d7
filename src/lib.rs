//! Gravity frame library.
//!
//! Gives every actor of a 3-D scene a local frame aligned with the gravity
//! source owning its position, turns that frame smoothly when the actor moves
//! between sources, and re-expresses actors in each other's frames while a
//! behavior runs.
//!
//! - [`math`] – deterministic fixed-point vectors, matrices and angles
//! - [`fields`] – gravity source shapes
//! - [`components`], [`resources`], [`systems`], [`events`] – the ECS side

pub mod components;
pub mod events;
pub mod fields;
pub mod math;
pub mod resources;
pub mod systems;
