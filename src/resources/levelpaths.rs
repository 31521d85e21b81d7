//! Level path data.
//!
//! A level describes its gravity sources as paths: an ordered list of nodes
//! plus a shape code. Only paths whose shape code falls in the gravity range
//! produce fields; everything else in the level's path list belongs to other
//! systems and is ignored here.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "paths": [
//!     { "shape": 64, "priority": 1, "points": [[0, -100, 0], [0, 0, 0]] },
//!     { "shape": 66, "priority": 2, "camera_settings": 1,
//!       "points": [[0, 0, 0], [5, 10, 0]] }
//!   ],
//!   "camera_settings": [[1000, 250, 1000, 250, 0, 30, 24, 0]],
//!   "entrance_view": [0, 40, -60]
//! }
//! ```

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::Vector3;

/// First shape code used for gravity paths.
pub const GRAVITY_SHAPE_BASE: u8 = 0x40;
/// Last shape code reserved for gravity paths.
pub const GRAVITY_SHAPE_LAST: u8 = 0x50;

/// Shape code of radial fields (two nodes) and axial chains (three or more).
pub const SHAPE_RADIAL_OR_AXIAL: u8 = GRAVITY_SHAPE_BASE;
pub const SHAPE_HOMOGENEOUS_CYLINDER: u8 = GRAVITY_SHAPE_BASE + 1;
pub const SHAPE_TRIVIAL_CYLINDER: u8 = GRAVITY_SHAPE_BASE + 2;

/// One authored path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PathDescriptor {
    /// Shape selector code.
    pub shape: u8,
    /// Higher priorities are tested first.
    #[serde(default)]
    pub priority: i16,
    /// Camera settings row used while the primary actor is in this field.
    #[serde(default)]
    pub camera_settings: u8,
    /// Nodes in world units.
    pub points: Vec<[f64; 3]>,
}

impl PathDescriptor {
    pub fn new(shape: u8, priority: i16, points: Vec<[f64; 3]>) -> Self {
        Self {
            shape,
            priority,
            camera_settings: 0,
            points,
        }
    }

    pub fn with_camera_settings(mut self, id: u8) -> Self {
        self.camera_settings = id;
        self
    }

    pub fn is_gravity_path(&self) -> bool {
        (GRAVITY_SHAPE_BASE..=GRAVITY_SHAPE_LAST).contains(&self.shape)
    }

    pub fn num_nodes(&self) -> usize {
        self.points.len()
    }

    /// Node `i` as a fixed-point position.
    pub fn node(&self, i: usize) -> Option<Vector3> {
        self.points.get(i).map(|[x, y, z]| Vector3::from_num(*x, *y, *z))
    }

    pub fn nodes(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.points
            .iter()
            .map(|[x, y, z]| Vector3::from_num(*x, *y, *z))
    }
}

/// The gravity-related part of a level.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LevelPaths {
    #[serde(default)]
    pub paths: Vec<PathDescriptor>,
    /// Rows of camera settings referenced by `PathDescriptor::camera_settings`.
    #[serde(default)]
    pub camera_settings: Vec<[i16; 8]>,
    /// Where the scene is first viewed from; steers the primary actor's first frame.
    #[serde(default)]
    pub entrance_view: Option<[f64; 3]>,
}

impl LevelPaths {
    pub fn from_json_str(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let level: LevelPaths = serde_json::from_str(json)?;
        Ok(level)
    }

    /// Loads level path data from a JSON file.
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file_content = std::fs::read_to_string(path)?;
        Self::from_json_str(&file_content)
    }

    pub fn entrance_view_point(&self) -> Option<Vector3> {
        self.entrance_view
            .map(|[x, y, z]| Vector3::from_num(x, y, z))
    }

    pub fn gravity_paths(&self) -> impl Iterator<Item = &PathDescriptor> {
        self.paths.iter().filter(|p| p.is_gravity_path())
    }
}
