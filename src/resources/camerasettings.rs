//! Camera settings rows referenced by gravity fields.
//!
//! Each authored field names a row of camera parameters. A missing row
//! falls back to the settings in use before, and without those to
//! [`CameraSettings::DEFAULT`].

use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;
use log::warn;

/// Maximum number of rows; ids are one byte.
pub const MAX_CAMERA_SETTINGS: usize = 256;

/// One row of camera parameters. The meaning of each slot belongs to the
/// camera; gravity only routes the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraSettings {
    pub values: [i16; 8],
}

impl CameraSettings {
    pub const DEFAULT: Self = Self {
        values: [1000, 250, 1000, 250, 0, 30, 24, 0],
    };

    pub fn new(values: [i16; 8]) -> Self {
        Self { values }
    }

    pub fn max_distance(&self) -> i16 {
        self.values[0]
    }

    pub fn min_distance(&self) -> i16 {
        self.values[1]
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Rows loaded with the level.
#[derive(Resource, Debug, Clone, Default)]
pub struct CameraSettingsTable {
    rows: ArrayVec<CameraSettings, MAX_CAMERA_SETTINGS>,
}

impl CameraSettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw rows. Rows past the id range are dropped with a warning.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a [i16; 8]>) -> Self {
        let mut table = Self::new();
        for row in rows {
            if table.rows.try_push(CameraSettings::new(*row)).is_err() {
                warn!("more than {} camera settings rows, rest ignored", MAX_CAMERA_SETTINGS);
                break;
            }
        }
        table
    }

    pub fn get(&self, id: u8) -> Option<&CameraSettings> {
        self.rows.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `id`, else the `previous` settings, else the defaults.
    pub fn resolve(&self, id: u8, previous: Option<&CameraSettings>) -> CameraSettings {
        self.get(id)
            .or(previous)
            .copied()
            .unwrap_or(CameraSettings::DEFAULT)
    }
}

/// Settings currently in use by the camera following the primary actor.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveCameraSettings {
    pub current: Option<CameraSettings>,
}

impl ActiveCameraSettings {
    /// Switch to row `id` of `table`, keeping the current settings when the
    /// row does not exist.
    pub fn select(&mut self, table: &CameraSettingsTable, id: u8) -> CameraSettings {
        let next = table.resolve(id, self.current.as_ref());
        self.current = Some(next);
        next
    }

    pub fn get(&self) -> CameraSettings {
        self.current.unwrap_or(CameraSettings::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_order() {
        let table = CameraSettingsTable::from_rows(&[[1, 2, 3, 4, 5, 6, 7, 8]]);
        let prev = CameraSettings::new([9; 8]);
        assert_eq!(table.resolve(0, Some(&prev)).values[0], 1);
        assert_eq!(table.resolve(5, Some(&prev)), prev);
        assert_eq!(table.resolve(5, None), CameraSettings::DEFAULT);
        assert_eq!(CameraSettings::DEFAULT.max_distance(), 1000);
        assert_eq!(CameraSettings::DEFAULT.min_distance(), 250);
    }

    #[test]
    fn empty_table_uses_defaults() {
        let table = CameraSettingsTable::new();
        assert!(table.is_empty());
        assert_eq!(table.resolve(0, None), CameraSettings::DEFAULT);
    }

    #[test]
    fn active_settings_keep_previous_row() {
        let table = CameraSettingsTable::from_rows(&[[7; 8]]);
        let mut active = ActiveCameraSettings::default();
        assert_eq!(active.get(), CameraSettings::DEFAULT);
        assert_eq!(active.select(&table, 0).values[0], 7);
        assert_eq!(active.select(&table, 9).values[0], 7);
    }

    #[test]
    fn rows_beyond_capacity_are_dropped() {
        let rows = vec![[0i16; 8]; MAX_CAMERA_SETTINGS + 3];
        let table = CameraSettingsTable::from_rows(&rows);
        assert_eq!(table.len(), MAX_CAMERA_SETTINGS);
    }
}
