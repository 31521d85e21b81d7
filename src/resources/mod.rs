//! ECS resources made available to systems.
//!
//! Overview
//! - `actorlist` – per-field rings of attached actors
//! - `camerasettings` – camera rows referenced by fields, and the active row
//! - `driverslot` – guard allowing a single running behavior
//! - `fieldindex` – the scene's fields in priority order, and field resolution
//! - `gravityconfig` – orientation tunables loaded from INI
//! - `levelpaths` – authored gravity paths loaded from JSON
//! - `viewaxes` – camera axes and the entrance view point
pub mod actorlist;
pub mod camerasettings;
pub mod driverslot;
pub mod fieldindex;
pub mod gravityconfig;
pub mod levelpaths;
pub mod viewaxes;
