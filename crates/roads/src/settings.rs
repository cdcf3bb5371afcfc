use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_CROSSROAD_POINTS_OFFSET, DEFAULT_GRID_SCALE_MULTIPLIER, MIN_CROSSROAD_POINTS_OFFSET,
};
use crate::error::SettingsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossroadSettings {
    /// Distance (m) by which segment ends are pulled away from a crossroad.
    pub points_offset: f32,
    pub build_crosswalks: bool,
}

impl Default for CrossroadSettings {
    fn default() -> Self {
        Self {
            points_offset: DEFAULT_CROSSROAD_POINTS_OFFSET,
            build_crosswalks: true,
        }
    }
}

/// User settings of the road generator.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadGeneratorSettings {
    /// Directory searched for road type files.
    pub roads_path: PathBuf,
    /// Multiplier of the overlay grid scale used for grid snapping.
    pub grid_scale_multiplier: f32,
    pub debug: bool,
    pub current_road_type: String,
    /// Z coordinate new points are built with.
    pub current_road_height: f32,
    pub crossroad: CrossroadSettings,
}

impl Default for RoadGeneratorSettings {
    fn default() -> Self {
        Self {
            roads_path: PathBuf::from("assets/geonodes/roads"),
            grid_scale_multiplier: DEFAULT_GRID_SCALE_MULTIPLIER,
            debug: false,
            current_road_type: String::new(),
            current_road_height: 0.0,
            crossroad: CrossroadSettings::default(),
        }
    }
}

impl RoadGeneratorSettings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&contents)?;
        settings.clamp();
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Pull out-of-range values back into their allowed range.
    pub fn clamp(&mut self) {
        if self.crossroad.points_offset < MIN_CROSSROAD_POINTS_OFFSET {
            warn!(
                "Crossroad points offset {} is below {MIN_CROSSROAD_POINTS_OFFSET}, clamping",
                self.crossroad.points_offset
            );
            self.crossroad.points_offset = MIN_CROSSROAD_POINTS_OFFSET;
        }
    }

    /// Offset by which endpoints are moved away from a crossroad midpoint.
    pub fn crossroad_points_offset(&self) -> f32 {
        self.crossroad.points_offset.max(MIN_CROSSROAD_POINTS_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RoadGeneratorSettings::default();
        assert_eq!(settings.grid_scale_multiplier, 10.0);
        assert_eq!(settings.crossroad.points_offset, 15.0);
        assert!(settings.crossroad.build_crosswalks);
        assert!(!settings.debug);
        assert_eq!(settings.current_road_height, 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: RoadGeneratorSettings =
            serde_json::from_str(r#"{"current_road_height": 2.5, "crossroad": {"points_offset": 8.0}}"#)
                .unwrap();
        assert_eq!(settings.current_road_height, 2.5);
        assert_eq!(settings.crossroad.points_offset, 8.0);
        assert!(settings.crossroad.build_crosswalks);
        assert_eq!(settings.grid_scale_multiplier, 10.0);
    }

    #[test]
    fn test_load_clamps_points_offset() {
        let path = std::env::temp_dir().join(format!("roadgen_settings_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"crossroad": {"points_offset": 0.2}}"#).unwrap();
        let settings = RoadGeneratorSettings::load(&path).unwrap();
        assert_eq!(settings.crossroad.points_offset, MIN_CROSSROAD_POINTS_OFFSET);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let settings = RoadGeneratorSettings::load(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, RoadGeneratorSettings::default());
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let path = std::env::temp_dir().join(format!("roadgen_bad_{}.json", std::process::id()));
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            RoadGeneratorSettings::load(&path),
            Err(SettingsError::Parse(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
