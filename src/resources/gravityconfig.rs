//! Gravity configuration resource.
//!
//! Tunables for orientation transitions, loaded from an INI file. Missing
//! values keep their defaults, so an absent file is not fatal.
//!
//! # Configuration File Format
//!
//! ```ini
//! [orientation]
//! angular_accel_deg = 1.0
//! transition_budget_deg = 180.0
//! move_threshold = 1.0
//!
//! [scene]
//! level = ./levels/planets.json
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::math::Fix12;
use crate::math::trig::{HALF_TURN, ONE_DEGREE, angle_to_degrees, degrees_to_angle};

/// Default safe values for startup
const DEFAULT_ANGULAR_ACCEL: i32 = ONE_DEGREE;
const DEFAULT_TRANSITION_BUDGET: i32 = HALF_TURN;
const DEFAULT_MOVE_THRESHOLD: Fix12 = Fix12::ONE;
const DEFAULT_CONFIG_PATH: &str = "./gravity.ini";

/// The values a frame update needs, copied out of [`GravityConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrientationTuning {
    /// Angular acceleration of up-vector transitions, binary angle units per step squared.
    pub angular_accel: i32,
    /// Largest angle a transition may still cover right after a field change.
    pub transition_budget: i32,
    /// Movement below this distance skips the update.
    pub move_threshold: Fix12,
}

impl Default for OrientationTuning {
    fn default() -> Self {
        Self {
            angular_accel: DEFAULT_ANGULAR_ACCEL,
            transition_budget: DEFAULT_TRANSITION_BUDGET,
            move_threshold: DEFAULT_MOVE_THRESHOLD,
        }
    }
}

/// Gravity configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GravityConfig {
    /// Angular acceleration in binary angle units.
    pub angular_accel: i32,
    /// Transition budget in binary angle units, at most a half turn.
    pub transition_budget: i32,
    /// Minimum movement that triggers a frame update.
    pub move_threshold: Fix12,
    /// Level to load when none is given on the command line.
    pub level_path: Option<PathBuf>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GravityConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        let tuning = OrientationTuning::default();
        Self {
            angular_accel: tuning.angular_accel,
            transition_budget: tuning.transition_budget,
            move_threshold: tuning.move_threshold,
            level_path: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn tuning(&self) -> OrientationTuning {
        OrientationTuning {
            angular_accel: self.angular_accel,
            transition_budget: self.transition_budget,
            move_threshold: self.move_threshold,
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded gravity config: accel={:.2}deg budget={:.1}deg threshold={} level={:?}",
            angle_to_degrees(self.angular_accel),
            angle_to_degrees(self.transition_budget),
            self.move_threshold,
            self.level_path
        );

        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [orientation] section
        if let Some(deg) = config
            .getfloat("orientation", "angular_accel_deg")
            .ok()
            .flatten()
        {
            self.angular_accel = degrees_to_angle(deg).max(0);
        }
        if let Some(deg) = config
            .getfloat("orientation", "transition_budget_deg")
            .ok()
            .flatten()
        {
            self.transition_budget = degrees_to_angle(deg).clamp(0, HALF_TURN);
        }
        if let Some(units) = config
            .getfloat("orientation", "move_threshold")
            .ok()
            .flatten()
        {
            self.move_threshold = Fix12::from_num(units.max(0.0));
        }

        // [scene] section
        if let Some(level) = config.get("scene", "level") {
            self.level_path = Some(PathBuf::from(level));
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [orientation] section
        config.set(
            "orientation",
            "angular_accel_deg",
            Some(angle_to_degrees(self.angular_accel).to_string()),
        );
        config.set(
            "orientation",
            "transition_budget_deg",
            Some(angle_to_degrees(self.transition_budget).to_string()),
        );
        config.set(
            "orientation",
            "move_threshold",
            Some(self.move_threshold.to_f64().to_string()),
        );

        // [scene] section
        if let Some(level) = &self.level_path {
            config.set("scene", "level", Some(level.display().to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved gravity config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GravityConfig::new();
        assert_eq!(c.angular_accel, 182);
        assert_eq!(c.transition_budget, 0x8000);
        assert_eq!(c.move_threshold, Fix12::ONE);
        assert_eq!(c.tuning(), OrientationTuning::default());
    }

    #[test]
    fn parses_values() {
        let mut c = GravityConfig::new();
        c.load_from_str(
            "[orientation]\nangular_accel_deg = 2.0\ntransition_budget_deg = 400\nmove_threshold = 0.5\n[scene]\nlevel = levels/a.json\n",
        )
        .unwrap();
        assert_eq!(c.angular_accel, 364);
        assert_eq!(c.transition_budget, 0x8000);
        assert_eq!(c.move_threshold, Fix12::HALF);
        assert_eq!(c.level_path, Some(PathBuf::from("levels/a.json")));
    }

    #[test]
    fn missing_values_keep_defaults() {
        let mut c = GravityConfig::new();
        c.load_from_str("[orientation]\nmove_threshold = 2\n").unwrap();
        assert_eq!(c.angular_accel, 182);
        assert_eq!(c.move_threshold, Fix12::from_int(2));
        assert!(c.level_path.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut c = GravityConfig::with_path("/nonexistent/gravity.ini");
        assert!(c.load_from_file().is_err());
        assert_eq!(c.angular_accel, 182);
    }

    #[test]
    fn save_and_reload() {
        let path = std::env::temp_dir().join(format!("gravity_cfg_{}.ini", std::process::id()));
        let mut c = GravityConfig::with_path(&path);
        c.angular_accel = 364;
        c.level_path = Some(PathBuf::from("x.json"));
        c.save_to_file().unwrap();
        let mut d = GravityConfig::with_path(&path);
        d.load_from_file().unwrap();
        assert_eq!(d.angular_accel, 364);
        assert_eq!(d.level_path, Some(PathBuf::from("x.json")));
        let _ = std::fs::remove_file(path);
    }
}
