//! Game settings and preferences
//!
//! Stored as JSON next to the binary. A missing or unreadable file means
//! defaults; settings never stop the game from starting.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TARGET_FPS;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Runtime ===
    /// Frame pacing target
    pub target_fps: u32,
    /// Where images and sounds are looked up
    pub asset_dir: PathBuf,
    /// Fixed RNG seed; `None` picks one from the clock
    pub seed: Option<u64>,

    // === Headless demo ===
    /// Level the demo runner plays (0-based)
    pub demo_level: usize,
    /// Stop the demo after this many simulated seconds
    pub demo_time_cap: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            music_volume: 0.7,
            muted: false,

            target_fps: TARGET_FPS,
            asset_dir: PathBuf::from("assets"),
            seed: None,

            demo_level: 0,
            demo_time_cap: 120.0,
        }
    }
}

impl Settings {
    /// Default file name
    pub const FILE_NAME: &'static str = "polutio.json";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::info!("Using default settings ({} is invalid: {e})", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp values a hand-edited file may have pushed out of range
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.target_fps = self.target_fps.clamp(1, 240);
        self.demo_time_cap = self.demo_time_cap.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join(Settings::FILE_NAME));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Settings::FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_and_clamping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Settings::FILE_NAME);
        std::fs::write(&path, r#"{ "seed": 7, "master_volume": 3.0, "target_fps": 0 }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.target_fps, 1);
        assert_eq!(settings.music_volume, 0.7);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Settings::FILE_NAME);
        let settings = Settings {
            muted: true,
            demo_level: 5,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }
}
