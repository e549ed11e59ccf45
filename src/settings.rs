//! Game settings
//!
//! Tuning values that are data, not code: movement speeds, the starting
//! weapon, level dimensions, render tints. Loaded from a RON file when
//! one is present so tweaks do not need a rebuild; everything has a
//! sensible default.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] ron::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Player move speed in tiles per second
    pub move_speed: f32,
    /// Turn rate in radians per second
    pub turn_speed: f32,
    /// Starting weapon key in the weapon registry
    pub weapon: String,
    pub map_width: i32,
    pub map_height: i32,
    pub ceiling_tint: [u8; 3],
    pub floor_tint: [u8; 3],
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            turn_speed: 2.6,
            weapon: "spitter".to_string(),
            map_width: 24,
            map_height: 24,
            ceiling_tint: [36, 38, 52],
            floor_tint: [52, 44, 38],
        }
    }
}

impl GameSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        Ok(ron::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");

        let mut settings = GameSettings::default();
        settings.move_speed = 4.5;
        settings.weapon = "spitter".to_string();
        settings.save(&path).unwrap();

        let loaded = GameSettings::load(&path).unwrap();
        assert_eq!(loaded.move_speed, 4.5);
        assert_eq!(loaded.weapon, "spitter");
        assert_eq!(loaded.map_width, settings.map_width);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = GameSettings::load(Path::new("/no/such/settings.ron"));
        assert!(matches!(err, Err(SettingsError::Io(_))));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let partial: GameSettings = ron::from_str("(move_speed: 2.0)").unwrap();
        assert_eq!(partial.move_speed, 2.0);
        assert_eq!(partial.turn_speed, GameSettings::default().turn_speed);
    }
}
