//! ECS components for actors.
//!
//! Submodules overview:
//! - [`carriedby`] – actor held by another actor
//! - [`frameproperties`] – convertible position and heading values
//! - [`gravityflags`] – per-actor gravity switches
//! - [`gravityframe`] – the actor's gravity-aligned basis and its state
//! - [`heading`] – facing and motion angles in the actor's frame
//! - [`primaryactor`] – marker for the player-controlled actor
//! - [`worldposition`] – current and previous world position

pub mod carriedby;
pub mod frameproperties;
pub mod gravityflags;
pub mod gravityframe;
pub mod heading;
pub mod primaryactor;
pub mod worldposition;
