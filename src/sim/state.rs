//! Session state and entity types
//!
//! One `Session` per level attempt. It exclusively owns every entity
//! collection and is only mutated by `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, SplitAxis};
use super::powerup::{ActiveEffects, PowerUpKind};
use super::progress::{Meter, Outcome, SessionPhase, stage_for_meter};
use super::spawn::Spawner;
use super::trail::GestureTrail;
use crate::assets::{Sprite, SpritePool};
use crate::consts::*;
use crate::levels::LevelConfig;

/// Things that happened during a tick (drained by the app)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Caught { good: bool },
    Missed { good: bool },
    Sliced { good: bool },
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    StageChanged(usize),
    Finished(Outcome),
}

/// The player-controlled catcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub speed: f32,
    pub facing_left: bool,
    /// Walk frame (0 or 1)
    pub frame_index: usize,
    anim_timer: f32,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            x: VIRTUAL_W / 2.0 - PLAYER_W / 2.0,
            y: PLAYER_Y,
            w: PLAYER_W,
            h: PLAYER_H,
            speed,
            facing_left: false,
            frame_index: 0,
            anim_timer: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Catch area, widened while the bigger basket is active
    pub fn catch_rect(&self, extra_width: f32) -> Rect {
        self.rect().widened(extra_width)
    }

    /// Move by held direction and advance the walk cycle
    pub fn update(&mut self, dt: f32, left: bool, right: bool) {
        let dx = right as i32 as f32 - left as i32 as f32;
        if dx < 0.0 {
            self.facing_left = true;
        } else if dx > 0.0 {
            self.facing_left = false;
        }
        self.x = (self.x + dx * self.speed * dt).clamp(0.0, VIRTUAL_W - self.w);

        if dx != 0.0 {
            self.anim_timer += dt;
            if self.anim_timer >= PLAYER_ANIM_RATE {
                self.anim_timer = 0.0;
                self.frame_index = (self.frame_index + 1) % 2;
            }
        } else {
            self.frame_index = 0;
            self.anim_timer = 0.0;
        }
    }
}

/// The oscillating item dispenser (printer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispenser {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// +1 right, -1 left
    pub dir: f32,
    pub base_speed: f32,
    /// Effective speed this frame (base scaled by slow motion)
    pub speed: f32,
}

impl Dispenser {
    pub fn new(base_speed: f32, dir: f32) -> Self {
        Self {
            x: VIRTUAL_W / 2.0 - DISPENSER_W / 2.0,
            y: DISPENSER_Y,
            w: DISPENSER_W,
            h: DISPENSER_H,
            dir,
            base_speed,
            speed: base_speed,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }

    /// Bottom edge, where drops come out
    pub fn slot_y(&self) -> f32 {
        self.y + self.h
    }

    /// Bounce between the playfield edges; `flip` forces a reversal
    pub fn update(&mut self, dt: f32, flip: bool) {
        self.x += self.dir * self.speed * dt;
        if self.x <= 0.0 {
            self.x = 0.0;
            self.dir = 1.0;
        }
        if self.x + self.w >= VIRTUAL_W {
            self.x = VIRTUAL_W - self.w;
            self.dir = -1.0;
        }
        if flip {
            self.dir = -self.dir;
        }
    }
}

/// A falling good/bad item (catch mode)
#[derive(Debug, Clone, Serialize)]
pub struct FallingItem {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Speed as spawned, before any global scaling
    pub base_vy: f32,
    /// Effective speed this frame
    pub vy: f32,
    pub size: Vec2,
    pub good: bool,
    pub sprite: Sprite,
}

impl FallingItem {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }

    /// Below the playfield by more than its own height
    pub fn is_out(&self) -> bool {
        self.pos.y - self.size.y > VIRTUAL_H
    }

    /// Fall, optionally pulled toward `magnet_x`
    pub fn update(&mut self, dt: f32, magnet_x: Option<f32>) {
        if let Some(target) = magnet_x {
            self.pos.x += (target - self.pos.x) * MAGNET_POWER * dt;
        }
        self.pos.y += self.vy * dt;
    }
}

/// A falling power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpDrop {
    pub id: u32,
    pub pos: Vec2,
    pub vy: f32,
    pub kind: PowerUpKind,
}

impl PowerUpDrop {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(POWERUP_DROP_SIZE))
    }

    pub fn is_out(&self) -> bool {
        self.pos.y - POWERUP_DROP_SIZE > VIRTUAL_H
    }
}

/// An item thrown in an arc (slice mode)
#[derive(Debug, Clone, Serialize)]
pub struct FlyingItem {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub good: bool,
    pub radius: f32,
    pub size: Vec2,
    pub sprite: Sprite,
}

impl FlyingItem {
    pub fn update(&mut self, dt: f32, gravity: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
    }
}

/// Which half of a sliced item a fragment is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentHalf {
    Top,
    Bottom,
    Left,
    Right,
}

/// Cosmetic half of a sliced item
#[derive(Debug, Clone, Serialize)]
pub struct SliceFragment {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees
    pub angle: f32,
    pub spin: f32,
    pub half: FragmentHalf,
    pub size: Vec2,
    pub sprite: Sprite,
}

impl SliceFragment {
    pub fn update(&mut self, dt: f32, gravity: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
        self.angle += self.spin * dt;
    }

    /// Past the despawn line `bottom`
    pub fn is_out(&self, bottom: f32) -> bool {
        self.pos.y > bottom
    }

    /// Split `item` along the cut chosen by `swipe`.
    ///
    /// Halves sit a quarter size off center and separate along the cut's
    /// normal; the drift sign follows the swipe direction.
    pub fn split(item: &FlyingItem, swipe: Vec2, spins: [f32; 2]) -> [SliceFragment; 2] {
        let half = |half, pos, vel, spin, size| SliceFragment {
            pos,
            vel,
            angle: 0.0,
            spin,
            half,
            size,
            sprite: item.sprite.clone(),
        };
        let (w, h) = (item.size.x, item.size.y);
        match SplitAxis::for_swipe(swipe) {
            SplitAxis::Horizontal => {
                let side = if swipe.x >= 0.0 { 1.0 } else { -1.0 };
                let size = Vec2::new(w, h / 2.0);
                [
                    half(
                        FragmentHalf::Top,
                        item.pos - Vec2::new(0.0, h * 0.25),
                        Vec2::new(FRAGMENT_DRIFT * side, item.vel.y - SLICE_SEPARATION),
                        spins[0],
                        size,
                    ),
                    half(
                        FragmentHalf::Bottom,
                        item.pos + Vec2::new(0.0, h * 0.25),
                        Vec2::new(-FRAGMENT_DRIFT * side, item.vel.y + SLICE_SEPARATION),
                        spins[1],
                        size,
                    ),
                ]
            }
            SplitAxis::Vertical => {
                let side = if swipe.y >= 0.0 { 1.0 } else { -1.0 };
                let size = Vec2::new(w / 2.0, h);
                [
                    half(
                        FragmentHalf::Left,
                        item.pos - Vec2::new(w * 0.25, 0.0),
                        Vec2::new(item.vel.x - SLICE_SEPARATION, FRAGMENT_DRIFT * side),
                        spins[0],
                        size,
                    ),
                    half(
                        FragmentHalf::Right,
                        item.pos + Vec2::new(w * 0.25, 0.0),
                        Vec2::new(item.vel.x + SLICE_SEPARATION, -FRAGMENT_DRIFT * side),
                        spins[1],
                        size,
                    ),
                ]
            }
        }
    }
}

/// Complete state of one level attempt
#[derive(Debug, Clone)]
pub struct Session {
    pub level: LevelConfig,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub meter: Meter,
    /// Countdown (seconds, never negative)
    pub time_left: f32,
    /// Simulated time since start (seconds)
    pub clock: f32,
    pub phase: SessionPhase,
    pub effects: ActiveEffects,
    pub player: Player,
    pub dispenser: Dispenser,
    pub items: Vec<FallingItem>,
    pub powerups: Vec<PowerUpDrop>,
    pub flying: Vec<FlyingItem>,
    pub fragments: Vec<SliceFragment>,
    pub trail: GestureTrail,
    pub spawner: Spawner,
    pub caught_good: u32,
    pub caught_bad: u32,
    /// Current background/audio stage
    pub stage_index: usize,
    pub sprites: SpritePool,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// Fresh attempt at `level` with the given seed
    pub fn new(mut level: LevelConfig, seed: u64, sprites: SpritePool) -> Self {
        if level.clamp_probabilities() {
            log::warn!("{}: probabilities clamped to [0, 1]", level.name);
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let (girl_speed, printer_speed) = level
            .catch_tuning()
            .map(|t| (t.girl_speed, t.printer_speed))
            .unwrap_or((0.0, 0.0));
        let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let meter = Meter::default();

        Self {
            time_left: level.time_limit_s,
            level,
            seed,
            rng,
            meter,
            clock: 0.0,
            phase: SessionPhase::Running,
            effects: ActiveEffects::default(),
            player: Player::new(girl_speed),
            dispenser: Dispenser::new(printer_speed, dir),
            items: Vec::new(),
            powerups: Vec::new(),
            flying: Vec::new(),
            fragments: Vec::new(),
            trail: GestureTrail::new(),
            spawner: Spawner::default(),
            caught_good: 0,
            caught_bad: 0,
            stage_index: stage_for_meter(meter),
            sprites,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Finished(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            SessionPhase::Finished(outcome) => Some(outcome),
            SessionPhase::Running => None,
        }
    }

    /// End the session; later calls are ignored
    pub fn finish(&mut self, outcome: Outcome) {
        if self.is_finished() {
            return;
        }
        self.phase = SessionPhase::Finished(outcome);
        self.events.push(GameEvent::Finished(outcome));
        log::info!(
            "{}: {} at {}% ({} good / {} bad)",
            self.level.name,
            outcome.message(),
            self.meter.value(),
            self.caught_good,
            self.caught_bad
        );
    }

    /// Fall speed multiplier from the meter: `1 + k * meter/100`
    pub fn progress_fall_scale(&self) -> f32 {
        let k = self.level.catch_tuning().map_or(0.0, |t| t.fall_scale_k);
        1.0 + k * self.meter.fraction()
    }

    /// Progress scale times slow motion, recomputed whenever asked
    pub fn fall_scale(&self) -> f32 {
        self.progress_fall_scale() * self.slowmo_multiplier()
    }

    pub fn slowmo_multiplier(&self) -> f32 {
        match self.level.catch_tuning() {
            Some(t) if self.effects.slow_motion() => t.slowmo_factor,
            _ => 1.0,
        }
    }

    /// Extra catch width while the bigger basket is active
    pub fn basket_extra(&self) -> f32 {
        match self.level.catch_tuning() {
            Some(t) if self.effects.enlarged_basket() => t.basket_expand_px,
            _ => 0.0,
        }
    }

    pub fn catch_rect(&self) -> Rect {
        self.player.catch_rect(self.basket_extra())
    }

    /// Re-derive every speed that depends on global modifiers.
    ///
    /// Speeds are always rebuilt from the stored base values so changes to
    /// the meter or slow motion apply to entities already in flight.
    pub fn rescale_speeds(&mut self) {
        let scale = self.fall_scale();
        for item in &mut self.items {
            item.vy = item.base_vy * scale;
        }
        self.dispenser.speed = self.dispenser.base_speed * self.slowmo_multiplier();
    }

    /// Meter change for a caught or sliced item
    pub fn score_item(&mut self, good: bool) {
        if good {
            let gain = if self.effects.double_gain() { 2 } else { 1 };
            self.meter.gain(gain);
        } else {
            self.meter.lose(1);
        }
    }

    /// Good items that get away cost a point; bad ones are free
    pub fn penalize_miss(&mut self, good: bool) {
        if good {
            self.meter.lose(1);
        }
    }

    /// Apply a collected power-up
    pub fn apply_powerup(&mut self, kind: PowerUpKind) {
        let duration = self
            .level
            .catch_tuning()
            .map_or(0.0, |t| t.powerup_duration_s);
        match kind {
            PowerUpKind::MoreTime => self.time_left += TIME_BONUS_SECS,
            PowerUpKind::LessTime => {
                self.time_left = (self.time_left - TIME_BONUS_SECS).max(0.0);
            }
            PowerUpKind::LessPercentage => self.meter.lose(LESS_PCT_LOSS),
            PowerUpKind::MorePercentage => self.meter.gain(MORE_PCT_GAIN),
            // Timed kinds act through the effect table
            PowerUpKind::BiggerBasket
            | PowerUpKind::DoublePercentage
            | PowerUpKind::Magnet
            | PowerUpKind::Stopwatch => {}
        }
        // Instant kinds only leave a short badge behind
        let seconds = match kind {
            PowerUpKind::DoublePercentage => DOUBLE_GAIN_SECS,
            _ if kind.is_timed() => duration,
            _ => INSTANT_BADGE_SECS,
        };
        self.effects.activate(kind, seconds);
        log::debug!("Power-up: {}", kind.label());
        self.events.push(GameEvent::PowerUpCollected(kind));
        self.rescale_speeds();
    }

    /// Count down active effects; expired ones revert this frame
    pub fn tick_effects(&mut self, dt: f32) {
        for kind in self.effects.tick(dt) {
            log::debug!("Power-up expired: {}", kind.label());
            self.events.push(GameEvent::PowerUpExpired(kind));
        }
        self.rescale_speeds();
    }

    /// Recompute the background stage from the meter
    pub fn refresh_stage(&mut self) {
        let stage = stage_for_meter(self.meter);
        if stage != self.stage_index {
            self.stage_index = stage;
            self.events.push(GameEvent::StageChanged(stage));
        }
    }

    /// Random sprite for a good/bad item (placeholder if the pool is empty)
    pub(crate) fn pick_sprite(&mut self, good: bool) -> Sprite {
        let pool = self.sprites.for_tag(good);
        if pool.is_empty() {
            return Sprite::Placeholder;
        }
        let idx = self.rng.random_range(0..pool.len());
        pool[idx].clone()
    }

    /// Drop every entity (quit to level select)
    pub fn clear_entities(&mut self) {
        self.items.clear();
        self.powerups.clear();
        self.flying.clear();
        self.fragments.clear();
        self.trail.clear();
        self.effects.clear();
        self.rescale_speeds();
    }
}
