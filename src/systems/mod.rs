//! Gravity systems.
//!
//! Submodules overview
//! - [`attach`] – attach/detach actors, load and unload scene fields
//! - [`behavior`] – run a behavior in the actor's frame (convert/restore)
//! - [`gravity`] – per-tick frame updates and primary actor queries

pub mod attach;
pub mod behavior;
pub mod gravity;
