//! Render snapshots
//!
//! Immutable captures of game state taken after the frame's update. A
//! renderer draws from these and never sees the live session.

use glam::Vec2;
use serde::Serialize;

use crate::app::LevelResult;
use crate::assets::Sprite;
use crate::levels::BgStage;
use crate::sim::{FragmentHalf, PowerUpKind, Rect, Session};

/// Placeholder colors when an item sprite is missing
pub const GOOD_ITEM_COLOR: [u8; 3] = [70, 200, 110];
pub const BAD_ITEM_COLOR: [u8; 3] = [220, 70, 70];

/// High-level render state for the current screen.
#[derive(Debug, Clone, Serialize)]
pub enum RenderState {
    MainMenu,
    LevelSelect(Vec<LevelEntry>),
    InGame(Box<GameplaySnapshot>),
    GameOver(LevelResult),
}

/// One level-select button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelEntry {
    pub index: usize,
    pub label: String,
    /// Drawn in a different color
    pub slice_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub rect: Rect,
    pub facing_left: bool,
    pub frame_index: usize,
    /// Use the big sprite set
    pub enlarged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub rect: Rect,
    pub sprite: Sprite,
    pub fallback_color: [u8; 3],
    pub good: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub rect: Rect,
    pub kind: PowerUpKind,
    pub icon: &'static str,
    pub fallback_color: [u8; 3],
}

/// Active power-up indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub kind: PowerUpKind,
    pub text: &'static str,
    pub remaining: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlyingView {
    pub center: Vec2,
    pub size: Vec2,
    pub radius: f32,
    pub sprite: Sprite,
    pub fallback_color: [u8; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct FragmentView {
    pub center: Vec2,
    pub size: Vec2,
    /// Degrees
    pub angle: f32,
    pub half: FragmentHalf,
    pub sprite: Sprite,
}

/// Snapshot of gameplay state for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct GameplaySnapshot {
    pub level_name: String,
    pub slice_mode: bool,

    pub player: PlayerView,
    pub dispenser: Rect,
    pub items: Vec<ItemView>,
    pub powerups: Vec<PowerUpView>,
    /// Sorted by kind
    pub badges: Vec<Badge>,

    pub flying: Vec<FlyingView>,
    pub fragments: Vec<FragmentView>,
    /// Gesture trail, oldest first
    pub trail: Vec<Vec2>,

    /// HUD
    pub meter: u8,
    pub time_left: f32,
    pub caught_good: u32,
    pub caught_bad: u32,
    pub stage_index: usize,
    pub background: Option<BgStage>,
}

fn item_color(good: bool) -> [u8; 3] {
    if good { GOOD_ITEM_COLOR } else { BAD_ITEM_COLOR }
}

impl GameplaySnapshot {
    pub fn capture(session: &Session) -> Self {
        let player = PlayerView {
            rect: session.player.rect(),
            facing_left: session.player.facing_left,
            frame_index: session.player.frame_index,
            enlarged: session.effects.enlarged_basket(),
        };

        let items = session
            .items
            .iter()
            .map(|item| ItemView {
                rect: item.rect(),
                sprite: item.sprite.clone(),
                fallback_color: item_color(item.good),
                good: item.good,
            })
            .collect();

        let powerups = session
            .powerups
            .iter()
            .map(|drop| PowerUpView {
                rect: drop.rect(),
                kind: drop.kind,
                icon: drop.kind.icon_path(),
                fallback_color: drop.kind.fallback_color(),
            })
            .collect();

        let mut badges: Vec<Badge> = session
            .effects
            .iter()
            .map(|(kind, remaining)| Badge {
                kind,
                text: kind.badge_text(),
                remaining,
            })
            .collect();
        badges.sort_by_key(|b| b.kind);

        let flying = session
            .flying
            .iter()
            .map(|item| FlyingView {
                center: item.pos,
                size: item.size,
                radius: item.radius,
                sprite: item.sprite.clone(),
                fallback_color: item_color(item.good),
            })
            .collect();

        let fragments = session
            .fragments
            .iter()
            .map(|f| FragmentView {
                center: f.pos,
                size: f.size,
                angle: f.angle,
                half: f.half,
                sprite: f.sprite.clone(),
            })
            .collect();

        Self {
            level_name: session.level.name.clone(),
            slice_mode: session.level.mode.is_slice(),
            player,
            dispenser: session.dispenser.rect(),
            items,
            powerups,
            badges,
            flying,
            fragments,
            trail: session.trail.points(),
            meter: session.meter.value(),
            time_left: session.time_left,
            caught_good: session.caught_good,
            caught_bad: session.caught_bad,
            stage_index: session.stage_index,
            background: session.level.backgrounds.get(session.stage_index).cloned(),
        }
    }
}
