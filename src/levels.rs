//! Level catalog
//!
//! Each level is either a catch level or a slice level; the mode carries its
//! own tuning so nothing is inferred from the display name.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::STAGE_THRESHOLDS;

/// Number of meter-driven background stages per level
pub const STAGE_COUNT: usize = 6;

/// One background/audio presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgStage {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sound: Option<String>,
    /// Fill color when the image is missing
    #[serde(default = "default_fallback_color")]
    pub fallback_color: [u8; 3],
}

fn default_fallback_color() -> [u8; 3] {
    [24, 24, 28]
}

impl BgStage {
    pub fn new(image: &str, sound: &str, fallback_color: [u8; 3]) -> Self {
        Self {
            image: Some(image.to_string()),
            sound: Some(sound.to_string()),
            fallback_color,
        }
    }
}

/// Tuning for the catch game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchTuning {
    /// Base fall speed range (units/s)
    pub fall_speed_range: (f32, f32),
    pub printer_speed: f32,
    pub girl_speed: f32,
    pub powerup_interval_ms: f32,
    pub powerup_drop_prob: f64,
    pub powerup_duration_s: f32,
    pub slowmo_factor: f32,
    pub basket_expand_px: f32,
    /// Extra fall speed at 100% (1.0 = twice as fast)
    pub fall_scale_k: f32,
}

impl Default for CatchTuning {
    fn default() -> Self {
        Self {
            fall_speed_range: (220.0, 360.0),
            printer_speed: 360.0,
            girl_speed: 900.0,
            powerup_interval_ms: 2400.0,
            powerup_drop_prob: 0.55,
            powerup_duration_s: 6.0,
            slowmo_factor: 0.45,
            basket_expand_px: 120.0,
            fall_scale_k: 1.0,
        }
    }
}

/// Tuning for the slice game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceTuning {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Upward launch speed range
    pub launch_speed_range: (f32, f32),
    /// Horizontal launch speed is drawn from ±this
    pub max_lateral_speed: f32,
    /// Items die this far below the playfield
    pub despawn_margin: f32,
}

impl Default for SliceTuning {
    fn default() -> Self {
        Self {
            gravity: 1400.0,
            launch_speed_range: (1350.0, 1750.0),
            max_lateral_speed: 520.0,
            despawn_margin: 200.0,
        }
    }
}

/// Which game a level plays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum LevelMode {
    Catch(CatchTuning),
    Slice(SliceTuning),
}

impl LevelMode {
    pub fn is_slice(&self) -> bool {
        matches!(self, LevelMode::Slice(_))
    }
}

/// Immutable per-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    pub spawn_interval_ms: f32,
    /// Probability that a spawned item is good
    pub good_prob: f64,
    pub max_items: usize,
    pub item_size: Vec2,
    pub backgrounds: Vec<BgStage>,
    #[serde(default = "default_time_limit")]
    pub time_limit_s: f32,
    pub mode: LevelMode,
}

fn default_time_limit() -> f32 {
    60.0
}

impl LevelConfig {
    pub fn catch_tuning(&self) -> Option<&CatchTuning> {
        match &self.mode {
            LevelMode::Catch(t) => Some(t),
            LevelMode::Slice(_) => None,
        }
    }

    /// Level-select button text
    pub fn select_label(&self, index: usize) -> String {
        format!(
            "{}. {} • time {}s • good {}%",
            index + 1,
            self.name,
            self.time_limit_s as u32,
            (self.good_prob * 100.0) as u32
        )
    }

    /// Pull probabilities back into [0, 1] (NaN becomes 0); true if any moved
    pub(crate) fn clamp_probabilities(&mut self) -> bool {
        let mut changed = clamp_unit(&mut self.good_prob);
        if let LevelMode::Catch(t) = &mut self.mode {
            changed |= clamp_unit(&mut t.powerup_drop_prob);
        }
        changed
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.backgrounds.len() != STAGE_COUNT {
            return Err(CatalogError::StageCount {
                level: self.name.clone(),
                found: self.backgrounds.len(),
            });
        }
        check_probability(&self.name, "good_prob", self.good_prob)?;
        if self.spawn_interval_ms < 0.0 || self.time_limit_s <= 0.0 {
            return Err(CatalogError::InvalidRange {
                level: self.name.clone(),
                field: "spawn_interval_ms/time_limit_s",
            });
        }
        match &self.mode {
            LevelMode::Catch(t) => {
                check_probability(&self.name, "powerup_drop_prob", t.powerup_drop_prob)?;
                check_range(&self.name, "fall_speed_range", t.fall_speed_range)?;
            }
            LevelMode::Slice(t) => {
                check_range(&self.name, "launch_speed_range", t.launch_speed_range)?;
            }
        }
        Ok(())
    }
}

fn clamp_unit(value: &mut f64) -> bool {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let changed = clamped != *value;
    *value = clamped;
    changed
}

fn check_probability(level: &str, field: &'static str, value: f64) -> Result<(), CatalogError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CatalogError::InvalidProbability {
            level: level.to_string(),
            field,
            value,
        })
    }
}

fn check_range(level: &str, field: &'static str, range: (f32, f32)) -> Result<(), CatalogError> {
    if range.0 <= range.1 {
        Ok(())
    } else {
        Err(CatalogError::InvalidRange {
            level: level.to_string(),
            field,
        })
    }
}

/// Catalog loading/validation failures
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Empty,
    StageCount { level: String, found: usize },
    InvalidProbability {
        level: String,
        field: &'static str,
        value: f64,
    },
    InvalidRange { level: String, field: &'static str },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read level catalog: {e}"),
            Self::Parse(e) => write!(f, "invalid level catalog: {e}"),
            Self::Empty => write!(f, "level catalog is empty"),
            Self::StageCount { level, found } => write!(
                f,
                "level '{level}' has {found} background stages, expected {STAGE_COUNT}"
            ),
            Self::InvalidProbability { level, field, value } => {
                write!(f, "level '{level}': {field} = {value} is not in [0, 1]")
            }
            Self::InvalidRange { level, field } => write!(f, "level '{level}': invalid {field}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Ordered list of levels offered at level select
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} levels from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, index: usize) -> Option<&LevelConfig> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }

    /// The reference six levels
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                catch_level(
                    "Level 1 • Starter",
                    650.0,
                    0.62,
                    14,
                    60.0,
                    CatchTuning {
                        fall_speed_range: (220.0, 360.0),
                        printer_speed: 360.0,
                        girl_speed: 900.0,
                        fall_scale_k: 1.0,
                        ..Default::default()
                    },
                    stages(
                        "",
                        [
                            [30, 30, 40],
                            [35, 45, 70],
                            [40, 70, 80],
                            [50, 80, 60],
                            [70, 85, 50],
                            [100, 100, 100],
                        ],
                    ),
                ),
                catch_level(
                    "Level 2 • Rush",
                    420.0,
                    0.5,
                    18,
                    75.0,
                    CatchTuning {
                        fall_speed_range: (320.0, 520.0),
                        printer_speed: 520.0,
                        girl_speed: 1100.0,
                        powerup_interval_ms: 2000.0,
                        fall_scale_k: 1.2,
                        ..Default::default()
                    },
                    stages(
                        "l2_",
                        [
                            [28, 20, 28],
                            [38, 28, 52],
                            [52, 38, 70],
                            [40, 70, 60],
                            [60, 88, 40],
                            [110, 110, 110],
                        ],
                    ),
                ),
                catch_level(
                    "Level 3 • Storm",
                    360.0,
                    0.5,
                    20,
                    80.0,
                    CatchTuning {
                        fall_speed_range: (360.0, 560.0),
                        printer_speed: 600.0,
                        girl_speed: 1200.0,
                        powerup_interval_ms: 1900.0,
                        fall_scale_k: 1.3,
                        ..Default::default()
                    },
                    stages(
                        "l3_",
                        [
                            [22, 26, 34],
                            [30, 34, 62],
                            [44, 54, 82],
                            [40, 72, 70],
                            [70, 90, 52],
                            [120, 120, 120],
                        ],
                    ),
                ),
                catch_level(
                    "Level 4 • Frenzy",
                    300.0,
                    0.48,
                    22,
                    85.0,
                    CatchTuning {
                        fall_speed_range: (380.0, 640.0),
                        printer_speed: 720.0,
                        girl_speed: 1300.0,
                        powerup_interval_ms: 1800.0,
                        fall_scale_k: 1.4,
                        ..Default::default()
                    },
                    stages(
                        "l4_",
                        [
                            [16, 18, 28],
                            [28, 26, 58],
                            [46, 36, 70],
                            [44, 70, 66],
                            [68, 92, 56],
                            [140, 140, 140],
                        ],
                    ),
                ),
                catch_level(
                    "Level 5 • Overdrive",
                    260.0,
                    0.46,
                    24,
                    90.0,
                    CatchTuning {
                        fall_speed_range: (420.0, 720.0),
                        printer_speed: 820.0,
                        girl_speed: 1400.0,
                        powerup_interval_ms: 1700.0,
                        fall_scale_k: 1.5,
                        ..Default::default()
                    },
                    stages(
                        "l5_",
                        [
                            [12, 12, 22],
                            [24, 22, 48],
                            [40, 30, 66],
                            [36, 68, 66],
                            [66, 94, 60],
                            [160, 160, 160],
                        ],
                    ),
                ),
                LevelConfig {
                    name: "SPECIAL LEVEL".to_string(),
                    spawn_interval_ms: 950.0,
                    good_prob: 0.5,
                    max_items: 8,
                    item_size: Vec2::new(70.0, 70.0),
                    backgrounds: stages(
                        "special_",
                        [
                            [16, 16, 20],
                            [24, 28, 44],
                            [36, 40, 60],
                            [42, 64, 60],
                            [56, 84, 58],
                            [120, 120, 120],
                        ],
                    ),
                    time_limit_s: 60.0,
                    mode: LevelMode::Slice(SliceTuning::default()),
                },
            ],
        }
    }
}

fn catch_level(
    name: &str,
    spawn_interval_ms: f32,
    good_prob: f64,
    max_items: usize,
    time_limit_s: f32,
    tuning: CatchTuning,
    backgrounds: Vec<BgStage>,
) -> LevelConfig {
    LevelConfig {
        name: name.to_string(),
        spawn_interval_ms,
        good_prob,
        max_items,
        item_size: Vec2::new(50.0, 50.0),
        backgrounds,
        time_limit_s,
        mode: LevelMode::Catch(tuning),
    }
}

/// Stage art follows `<prefix>bg_<threshold>.png`; music is shared
fn stages(prefix: &str, colors: [[u8; 3]; STAGE_COUNT]) -> Vec<BgStage> {
    const TRACKS: [&str; STAGE_COUNT] = [
        "bg_40.mp3",
        "bg_40.mp3",
        "bg_40.mp3",
        "bg_60.mp3",
        "bg_80.mp3",
        "bg_100.mp3",
    ];
    STAGE_THRESHOLDS
        .iter()
        .zip(TRACKS)
        .zip(colors)
        .map(|((t, track), color)| BgStage::new(&format!("{prefix}bg_{t}.png"), track, color))
        .collect()
}
