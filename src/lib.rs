//! Polutio - a falling-item catcher with a slicing minigame
//!
//! Core modules:
//! - `sim`: Seeded simulation (spawning, motion, catches/slices, power-ups, win/lose)
//! - `levels`: Level catalog and per-mode tuning
//! - `app`: Screen flow (menu, level select, playing, game over)
//! - `platform`: Runtime context, frame clock and input normalization
//! - `snapshot`: Read-only per-frame view for a renderer

pub mod app;
pub mod assets;
pub mod audio;
pub mod levels;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use app::{App, AppError, LevelResult, Screen};
pub use levels::{LevelCatalog, LevelConfig, LevelMode};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Virtual playfield (everything is simulated in these coordinates)
    pub const VIRTUAL_W: f32 = 1920.0;
    pub const VIRTUAL_H: f32 = 1080.0;
    pub const TOP_BAR_H: f32 = 96.0;

    /// Target frame rate and the largest frame delta the sim will accept
    pub const TARGET_FPS: u32 = 60;
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Meter starts in the middle
    pub const START_METER: u8 = 50;
    pub const METER_MAX: u8 = 100;

    /// Player (catcher) body
    pub const PLAYER_W: f32 = 96.0;
    pub const PLAYER_H: f32 = 192.0;
    pub const PLAYER_Y: f32 = VIRTUAL_H - 160.0;
    /// Seconds per walk frame
    pub const PLAYER_ANIM_RATE: f32 = 0.12;

    /// Dispenser (printer) body, drawn just under the top bar
    pub const DISPENSER_W: f32 = 180.0;
    pub const DISPENSER_H: f32 = 140.0;
    pub const DISPENSER_Y: f32 = TOP_BAR_H + 8.0;
    /// Per-frame chance of a spontaneous direction flip
    pub const DISPENSER_REVERSAL_CHANCE: f64 = 0.004;

    /// Item drop offset below the dispenser slot
    pub const ITEM_DROP_OFFSET: f32 = 10.0;
    pub const POWERUP_DROP_OFFSET: f32 = 12.0;
    pub const POWERUP_DROP_SIZE: f32 = 44.0;
    /// Power-up drops fall a bit slower than items
    pub const POWERUP_SPEED_FACTOR: f32 = 0.9;

    /// Magnet pull rate toward the player's center (per second)
    pub const MAGNET_POWER: f32 = 4.5;
    /// Instant power-ups only show a badge for this long
    pub const INSTANT_BADGE_SECS: f32 = 1.0;
    /// Double-percentage ignores the level's power-up duration
    pub const DOUBLE_GAIN_SECS: f32 = 5.0;
    pub const TIME_BONUS_SECS: f32 = 5.0;
    pub const MORE_PCT_GAIN: u8 = 5;
    pub const LESS_PCT_LOSS: u8 = 2;

    /// Slice mode
    pub const TRAIL_WINDOW_SECS: f32 = 0.18;
    pub const SLICE_SEPARATION: f32 = 360.0;
    pub const FRAGMENT_DRIFT: f32 = 120.0;
    pub const FRAGMENT_SPIN_MAX: f32 = 220.0;
    pub const SLICE_LAUNCH_Y_OFFSET: f32 = 40.0;
    pub const SLICE_LAUNCH_X_MIN: f32 = 0.18;
    pub const SLICE_LAUNCH_X_MAX: f32 = 0.82;
    /// Radius used when the item sprite did not resolve
    pub const PLACEHOLDER_HIT_RADIUS: f32 = 22.0;
    pub const SLICE_MIN_INTERVAL_MS: f32 = 250.0;
    pub const SLICE_INTERVAL_CUT_MS: f32 = 100.0;
    pub const SLICE_BURST_MAX: u32 = 3;
}

/// Scale a window-space position into the virtual playfield
#[inline]
pub fn window_to_virtual(px: f32, py: f32, window_w: f32, window_h: f32) -> glam::Vec2 {
    if window_w <= 0.0 || window_h <= 0.0 {
        return glam::Vec2::ZERO;
    }
    glam::Vec2::new(
        (px * consts::VIRTUAL_W / window_w).floor(),
        (py * consts::VIRTUAL_H / window_h).floor(),
    )
}
