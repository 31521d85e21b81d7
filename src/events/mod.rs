//! Event types and observers.
//!
//! Submodules:
//! - [`fieldchange`] – an actor's owning gravity field changed
pub mod fieldchange;
