//! Per-frame simulation step
//!
//! Order within a playing frame: countdown, power-up timers, movement,
//! spawning, speed rescale, catches/slices, stage refresh, win/lose.

use glam::Vec2;
use rand::Rng;

use super::collision::slice_hit;
use super::powerup::PowerUpKind;
use super::progress::Outcome;
use super::state::{FallingItem, FlyingItem, GameEvent, PowerUpDrop, Session, SliceFragment};
use crate::assets::Sprite;
use crate::consts::*;
use crate::levels::{CatchTuning, LevelMode, SliceTuning};

/// Normalized input for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Pointer position in playfield coordinates
    pub pointer: Vec2,
    pub pointer_held: bool,
    /// Idle/demo mode - the game plays itself
    pub idle_mode: bool,
}

/// Advance the session by `dt` seconds
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    session.events.clear();
    if session.is_finished() {
        return;
    }
    let dt = dt.max(0.0);

    let mut input = input.clone();
    if input.idle_mode {
        input = idle_input(session);
    }
    let input = &input;

    session.clock += dt;
    session.time_left -= dt;
    if session.time_left <= 0.0 {
        session.time_left = 0.0;
        session.finish(Outcome::TimeUp);
        return;
    }

    match session.level.mode {
        LevelMode::Catch(tuning) => tick_catch(session, input, dt, &tuning),
        LevelMode::Slice(tuning) => tick_slice(session, input, dt, &tuning),
    }

    session.refresh_stage();

    if session.meter.is_empty() {
        session.finish(Outcome::Failed);
    } else if session.meter.is_full() {
        session.finish(Outcome::Complete);
    }
}

fn tick_catch(session: &mut Session, input: &TickInput, dt: f32, tuning: &CatchTuning) {
    session.tick_effects(dt);

    session.player.update(dt, input.left, input.right);
    let flip = session.rng.random_bool(DISPENSER_REVERSAL_CHANCE);
    session.dispenser.update(dt, flip);

    if session.spawner.items.advance(dt, session.level.spawn_interval_ms) {
        spawn_item(session, tuning);
    }
    if session.spawner.powerups.advance(dt, tuning.powerup_interval_ms)
        && session.rng.random_bool(tuning.powerup_drop_prob)
    {
        spawn_powerup(session, tuning);
    }

    session.rescale_speeds();

    let catch_rect = session.catch_rect();
    let magnet_x = session
        .effects
        .magnet()
        .then(|| session.player.rect().center_x());

    // Each item gets exactly one outcome: caught, missed, or still falling
    let mut resolved = Vec::new();
    session.items.retain_mut(|item| {
        item.update(dt, magnet_x);
        if item.rect().intersects(&catch_rect) {
            resolved.push(GameEvent::Caught { good: item.good });
            false
        } else if item.is_out() {
            resolved.push(GameEvent::Missed { good: item.good });
            false
        } else {
            true
        }
    });
    for event in resolved {
        match event {
            GameEvent::Caught { good } => {
                session.score_item(good);
                if good {
                    session.caught_good += 1;
                } else {
                    session.caught_bad += 1;
                }
            }
            GameEvent::Missed { good } => session.penalize_miss(good),
            _ => {}
        }
        session.events.push(event);
    }

    let mut collected = Vec::new();
    session.powerups.retain_mut(|drop| {
        drop.pos.y += drop.vy * dt;
        if drop.rect().intersects(&catch_rect) {
            collected.push(drop.kind);
            false
        } else {
            !drop.is_out()
        }
    });
    for kind in collected {
        session.apply_powerup(kind);
    }
}

fn tick_slice(session: &mut Session, input: &TickInput, dt: f32, tuning: &SliceTuning) {
    session.tick_effects(dt);

    let interval =
        (session.level.spawn_interval_ms - SLICE_INTERVAL_CUT_MS).max(SLICE_MIN_INTERVAL_MS);
    if session.spawner.items.advance(dt, interval) {
        let burst = session.rng.random_range(1..=SLICE_BURST_MAX);
        for _ in 0..burst {
            if session.flying.len() < session.level.max_items {
                launch_item(session, tuning);
            }
        }
    }

    let bottom = VIRTUAL_H + tuning.despawn_margin;
    let mut escaped = Vec::new();
    session.flying.retain_mut(|item| {
        item.update(dt, tuning.gravity);
        if item.pos.y > bottom {
            escaped.push(item.good);
            false
        } else {
            true
        }
    });
    for good in escaped {
        session.penalize_miss(good);
        session.events.push(GameEvent::Missed { good });
    }

    for fragment in &mut session.fragments {
        fragment.update(dt, tuning.gravity);
    }
    session.fragments.retain(|f| !f.is_out(bottom));

    if input.pointer_held {
        session.trail.record(input.pointer, session.clock);
    }
    session.trail.purge(session.clock);

    if session.trail.len() >= 2 {
        let points = session.trail.points();
        let flying = std::mem::take(&mut session.flying);
        for item in flying {
            let Some(swipe) = slice_hit(item.pos, item.radius, &points) else {
                session.flying.push(item);
                continue;
            };
            session.score_item(item.good);
            if item.good {
                session.caught_good += 1;
            } else {
                session.caught_bad += 1;
            }
            session.events.push(GameEvent::Sliced { good: item.good });
            let spins = [
                session.rng.random_range(-FRAGMENT_SPIN_MAX..=FRAGMENT_SPIN_MAX),
                session.rng.random_range(-FRAGMENT_SPIN_MAX..=FRAGMENT_SPIN_MAX),
            ];
            session
                .fragments
                .extend(SliceFragment::split(&item, swipe, spins));
        }
    }
}

/// Uniform draw that tolerates a collapsed range
fn uniform(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    if lo < hi { rng.random_range(lo..=hi) } else { lo }
}

/// Drop one item from the dispenser, unless the cap is reached
fn spawn_item(session: &mut Session, tuning: &CatchTuning) {
    if session.items.len() >= session.level.max_items {
        return;
    }
    let good = session.rng.random_bool(session.level.good_prob);
    let base_vy = uniform(&mut session.rng, tuning.fall_speed_range);
    let sprite = session.pick_sprite(good);
    let id = session.next_entity_id();
    let pos = Vec2::new(
        session.dispenser.center_x(),
        session.dispenser.slot_y() + ITEM_DROP_OFFSET,
    );
    let vy = base_vy * session.fall_scale();
    session.items.push(FallingItem {
        id,
        pos,
        base_vy,
        vy,
        size: session.level.item_size,
        good,
        sprite,
    });
}

/// Drop a random power-up; its speed is fixed at spawn
fn spawn_powerup(session: &mut Session, tuning: &CatchTuning) {
    let kind = PowerUpKind::ALL[session.rng.random_range(0..PowerUpKind::COUNT)];
    let base_vy = uniform(&mut session.rng, tuning.fall_speed_range) * POWERUP_SPEED_FACTOR;
    let id = session.next_entity_id();
    let pos = Vec2::new(
        session.dispenser.center_x(),
        session.dispenser.slot_y() + POWERUP_DROP_OFFSET,
    );
    let vy = base_vy * session.fall_scale();
    session.powerups.push(PowerUpDrop { id, pos, vy, kind });
}

/// Throw one item up from below the playfield
fn launch_item(session: &mut Session, tuning: &SliceTuning) {
    let good = session.rng.random_bool(session.level.good_prob);
    let sprite = session.pick_sprite(good);
    let size = session.level.item_size;
    let radius = match sprite {
        Sprite::Image(_) => size.x.max(size.y) * 0.5,
        Sprite::Placeholder => PLACEHOLDER_HIT_RADIUS,
    };
    let x = uniform(
        &mut session.rng,
        (VIRTUAL_W * SLICE_LAUNCH_X_MIN, VIRTUAL_W * SLICE_LAUNCH_X_MAX),
    );
    let vy = -uniform(&mut session.rng, tuning.launch_speed_range);
    let vx = uniform(
        &mut session.rng,
        (-tuning.max_lateral_speed, tuning.max_lateral_speed),
    );
    let id = session.next_entity_id();
    session.flying.push(FlyingItem {
        id,
        pos: Vec2::new(x, VIRTUAL_H + SLICE_LAUNCH_Y_OFFSET),
        vel: Vec2::new(vx, vy),
        good,
        radius,
        size,
        sprite,
    });
}

/// Autoplay input for idle/demo mode
fn idle_input(session: &Session) -> TickInput {
    let mut input = TickInput::default();
    match session.level.mode {
        LevelMode::Catch(_) => {
            let player = session.player.rect();
            // Lowest good item still above the basket, else a helpful drop,
            // else wait under the dispenser
            let target = session
                .items
                .iter()
                .filter(|it| it.good && it.pos.y < player.bottom())
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|it| it.pos.x)
                .or_else(|| {
                    session
                        .powerups
                        .iter()
                        .filter(|p| {
                            !matches!(p.kind, PowerUpKind::LessTime | PowerUpKind::LessPercentage)
                        })
                        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                        .map(|p| p.pos.x)
                })
                .unwrap_or_else(|| session.dispenser.center_x());

            let dead_zone = 8.0;
            input.left = target < player.center_x() - dead_zone;
            input.right = target > player.center_x() + dead_zone;
        }
        LevelMode::Slice(_) => {
            let target = session
                .flying
                .iter()
                .filter(|it| it.good && it.pos.y < VIRTUAL_H)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
            if let Some(item) = target {
                // Alternate sides each frame so consecutive samples cross the center
                let frame = (session.clock * TARGET_FPS as f32) as u32;
                let side = if frame % 2 == 0 { -1.0 } else { 1.0 };
                input.pointer = item.pos + Vec2::new(side * (item.radius + 10.0), 0.0);
                input.pointer_held = true;
            }
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpritePool;
    use crate::levels::{LevelCatalog, LevelConfig};
    use crate::sim::progress::Meter;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn catch_level() -> LevelConfig {
        LevelCatalog::builtin().get(0).unwrap().clone()
    }

    fn slice_level() -> LevelConfig {
        LevelCatalog::builtin().get(5).unwrap().clone()
    }

    /// Catch level that never spawns anything on its own
    fn quiet_catch_level() -> LevelConfig {
        let mut level = catch_level();
        level.max_items = 0;
        if let LevelMode::Catch(t) = &mut level.mode {
            t.powerup_drop_prob = 0.0;
            t.fall_scale_k = 0.0;
        }
        level
    }

    fn quiet_slice_level() -> LevelConfig {
        let mut level = slice_level();
        level.max_items = 0;
        level
    }

    fn session(level: LevelConfig) -> Session {
        Session::new(level, 42, SpritePool::default())
    }

    fn item_at(session: &mut Session, pos: Vec2, good: bool, base_vy: f32) {
        let id = session.next_entity_id();
        session.items.push(FallingItem {
            id,
            pos,
            base_vy,
            vy: base_vy,
            size: Vec2::splat(50.0),
            good,
            sprite: Sprite::Placeholder,
        });
    }

    fn flying_at(session: &mut Session, pos: Vec2, vel: Vec2, good: bool) {
        let id = session.next_entity_id();
        session.flying.push(FlyingItem {
            id,
            pos,
            vel,
            good,
            radius: 20.0,
            size: Vec2::splat(40.0),
            sprite: Sprite::Placeholder,
        });
    }

    /// Pointer held down at `(x, y)`
    fn held_at(x: f32, y: f32) -> TickInput {
        TickInput {
            pointer: Vec2::new(x, y),
            pointer_held: true,
            ..Default::default()
        }
    }

    fn basket_center(session: &Session) -> Vec2 {
        let r = session.catch_rect();
        Vec2::new(r.center_x(), r.y + r.h / 2.0)
    }

    #[test]
    fn test_time_up_with_nothing_spawned() {
        let mut s = session(quiet_catch_level());
        let input = TickInput::default();
        let mut frames = 0;
        while !s.is_finished() && frames < 5000 {
            tick(&mut s, &input, DT);
            frames += 1;
        }
        assert_eq!(s.outcome(), Some(Outcome::TimeUp));
        assert_eq!(s.meter.value(), 50);
        assert_eq!(s.time_left, 0.0);
        assert!((s.clock - 60.0).abs() < 0.05);
        assert!(s.items.is_empty());
    }

    #[test]
    fn test_fifty_good_catches_complete_on_the_last() {
        let mut s = session(quiet_catch_level());
        let input = TickInput::default();
        for i in 1..=50u8 {
            let at = basket_center(&s);
            item_at(&mut s, at, true, 0.0);
            tick(&mut s, &input, DT);
            assert_eq!(s.meter.value(), 50 + i);
            if i < 50 {
                assert!(!s.is_finished(), "finished early at catch {i}");
            }
        }
        assert_eq!(s.outcome(), Some(Outcome::Complete));
        assert_eq!(s.caught_good, 50);
        assert!(s.events.contains(&GameEvent::Finished(Outcome::Complete)));
    }

    #[test]
    fn test_double_gain_catch_adds_two_capped() {
        let mut s = session(quiet_catch_level());
        s.apply_powerup(PowerUpKind::DoublePercentage);
        let at = basket_center(&s);
        item_at(&mut s, at, true, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 52);

        s.meter = Meter::new(99);
        item_at(&mut s, at, true, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 100);
        assert_eq!(s.outcome(), Some(Outcome::Complete));
    }

    #[test]
    fn test_bad_catch_loses_one_and_can_fail() {
        let mut s = session(quiet_catch_level());
        let at = basket_center(&s);
        item_at(&mut s, at, false, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 49);
        assert_eq!(s.caught_bad, 1);

        s.meter = Meter::new(1);
        item_at(&mut s, at, false, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 0);
        assert_eq!(s.outcome(), Some(Outcome::Failed));
    }

    #[test]
    fn test_missed_good_costs_one_missed_bad_is_free() {
        let mut s = session(quiet_catch_level());
        let below = Vec2::new(100.0, VIRTUAL_H + 60.0);
        item_at(&mut s, below, true, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 49);
        assert!(s.items.is_empty());
        assert!(s.events.contains(&GameEvent::Missed { good: true }));

        item_at(&mut s, below, false, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 49);
        assert!(s.items.is_empty());
    }

    #[test]
    fn test_catch_wins_over_miss_in_same_frame() {
        let mut s = session(quiet_catch_level());
        // Overlaps the basket bottom and is already past the playfield
        let x = s.player.rect().center_x();
        item_at(&mut s, Vec2::new(x, 1135.0), true, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.meter.value(), 51);
        assert_eq!(s.caught_good, 1);
        assert!(!s.events.iter().any(|e| matches!(e, GameEvent::Missed { .. })));
    }

    #[test]
    fn test_slow_motion_rescales_items_in_flight() {
        let mut s = session(quiet_catch_level());
        item_at(&mut s, Vec2::new(100.0, 300.0), true, 300.0);
        item_at(&mut s, Vec2::new(200.0, 300.0), false, 500.0);
        let base_speed = s.dispenser.base_speed;

        s.apply_powerup(PowerUpKind::Stopwatch);
        tick(&mut s, &TickInput::default(), DT);
        assert!((s.items[0].vy - 300.0 * 0.45).abs() < 1e-3);
        assert!((s.items[1].vy - 500.0 * 0.45).abs() < 1e-3);
        assert!((s.dispenser.speed - base_speed * 0.45).abs() < 1e-3);

        // Expiry restores base speeds
        s.effects.activate(PowerUpKind::Stopwatch, DT / 2.0);
        tick(&mut s, &TickInput::default(), DT);
        assert!(!s.effects.slow_motion());
        assert!((s.items[0].vy - 300.0).abs() < 1e-3);
        assert!((s.dispenser.speed - base_speed).abs() < 1e-3);
    }

    #[test]
    fn test_fall_speed_grows_with_meter() {
        let mut level = quiet_catch_level();
        if let LevelMode::Catch(t) = &mut level.mode {
            t.fall_scale_k = 1.0;
        }
        let mut s = session(level);
        item_at(&mut s, Vec2::new(100.0, 300.0), true, 200.0);
        tick(&mut s, &TickInput::default(), DT);
        assert!((s.items[0].vy - 300.0).abs() < 1e-3);

        s.meter = Meter::new(100);
        s.rescale_speeds();
        assert!((s.items[0].vy - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_reactivation_refreshes_without_stacking() {
        let mut s = session(quiet_catch_level());
        s.apply_powerup(PowerUpKind::BiggerBasket);
        let widened = s.catch_rect().w;
        for _ in 0..120 {
            tick(&mut s, &TickInput::default(), DT);
        }
        let remaining = s.effects.remaining(PowerUpKind::BiggerBasket).unwrap();
        assert!(remaining < 4.1);

        s.apply_powerup(PowerUpKind::BiggerBasket);
        assert_eq!(s.effects.remaining(PowerUpKind::BiggerBasket), Some(6.0));
        assert_eq!(s.catch_rect().w, widened);
    }

    #[test]
    fn test_powerup_drop_is_collected() {
        let mut s = session(quiet_catch_level());
        let at = basket_center(&s);
        let id = s.next_entity_id();
        s.powerups.push(PowerUpDrop {
            id,
            pos: at,
            vy: 0.0,
            kind: PowerUpKind::MoreTime,
        });
        tick(&mut s, &TickInput::default(), DT);
        assert!(s.powerups.is_empty());
        assert!((s.time_left - (60.0 - DT + 5.0)).abs() < 1e-3);
        assert!(s.events.contains(&GameEvent::PowerUpCollected(PowerUpKind::MoreTime)));
    }

    #[test]
    fn test_powerup_spawner_interval() {
        let mut level = quiet_catch_level();
        if let LevelMode::Catch(t) = &mut level.mode {
            t.powerup_drop_prob = 1.0;
        }
        let mut s = session(level);
        let mut frames = 0;
        while s.powerups.is_empty() && frames < 400 {
            tick(&mut s, &TickInput::default(), DT);
            frames += 1;
        }
        // 2400ms, give or take float accumulation
        assert!((144..=146).contains(&frames), "first drop after {frames} frames");
        assert_eq!(s.powerups.len(), 1);
        assert!(s.powerups[0].vy > 0.0);
        assert!(s.items.is_empty());
    }

    #[test]
    fn test_powerup_spawner_gated_by_probability() {
        let mut s = session(quiet_catch_level());
        for _ in 0..(20 * 60) {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert!(s.powerups.is_empty());
    }

    #[test]
    fn test_powerup_kinds_drawn_from_all() {
        let mut level = quiet_catch_level();
        if let LevelMode::Catch(t) = &mut level.mode {
            t.powerup_drop_prob = 1.0;
            t.powerup_interval_ms = 0.0;
        }
        let mut s = session(level);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..400 {
            tick(&mut s, &TickInput::default(), DT);
            seen.extend(s.powerups.iter().map(|p| p.kind));
            s.powerups.clear();
        }
        assert_eq!(seen.len(), PowerUpKind::COUNT);
    }

    #[test]
    fn test_dispenser_reverses_at_random() {
        let mut level = quiet_catch_level();
        if let LevelMode::Catch(t) = &mut level.mode {
            t.printer_speed = 0.0;
        }
        let mut s = session(level);
        let mut flips = 0;
        for _ in 0..3000 {
            let dir = s.dispenser.dir;
            tick(&mut s, &TickInput::default(), DT);
            if s.dispenser.dir != dir {
                flips += 1;
            }
        }
        // About 0.4% of frames
        assert!((1..=40).contains(&flips), "{flips} reversals");
        assert_eq!(s.dispenser.center_x(), VIRTUAL_W / 2.0);
    }

    #[test]
    fn test_magnet_pulls_toward_player_center() {
        let mut s = session(quiet_catch_level());
        item_at(&mut s, Vec2::new(100.0, 300.0), true, 0.0);
        item_at(&mut s, Vec2::new(1800.0, 300.0), false, 0.0);
        s.apply_powerup(PowerUpKind::Magnet);
        let target = s.player.rect().center_x();

        tick(&mut s, &TickInput::default(), DT);
        let pull = MAGNET_POWER * DT;
        assert!((s.items[0].pos.x - (100.0 + (target - 100.0) * pull)).abs() < 1e-3);
        assert!((s.items[1].pos.x - (1800.0 + (target - 1800.0) * pull)).abs() < 1e-3);
    }

    #[test]
    fn test_out_of_range_good_prob_spawns_good_items() {
        let mut level = catch_level();
        level.good_prob = 1.5;
        level.spawn_interval_ms = 0.0;
        let mut s = session(level);
        for _ in 0..10 {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert!(!s.items.is_empty());
        assert!(s.items.iter().all(|item| item.good));
    }

    #[test]
    fn test_stage_change_event() {
        let mut s = session(quiet_catch_level());
        s.meter = Meter::new(59);
        let at = basket_center(&s);
        item_at(&mut s, at, true, 0.0);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.stage_index, 3);
        assert!(s.events.contains(&GameEvent::StageChanged(3)));
    }

    #[test]
    fn test_item_spawner_respects_cap() {
        let mut level = catch_level();
        level.max_items = 2;
        level.spawn_interval_ms = 0.0;
        let mut s = session(level);
        for _ in 0..30 {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert_eq!(s.items.len(), 2);
        for item in &s.items {
            assert!(item.pos.y > s.dispenser.slot_y());
        }
    }

    #[test]
    fn test_player_moves_with_input() {
        let mut s = session(quiet_catch_level());
        let start = s.player.x;
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut s, &input, 0.1);
        assert!((s.player.x - (start - 90.0)).abs() < 1e-3);
        assert!(s.player.facing_left);
    }

    #[test]
    fn test_slice_hits_item_on_trail() {
        let mut s = session(quiet_slice_level());
        flying_at(&mut s, Vec2::new(500.0, 500.0), Vec2::ZERO, true);

        let a = held_at(480.0, 500.0);
        tick(&mut s, &a, DT);
        assert_eq!(s.flying.len(), 1);

        let b = held_at(520.0, 500.0);
        tick(&mut s, &b, DT);
        assert!(s.flying.is_empty());
        assert_eq!(s.meter.value(), 51);
        assert_eq!(s.fragments.len(), 2);
        assert!(s.events.contains(&GameEvent::Sliced { good: true }));
    }

    #[test]
    fn test_slice_misses_distant_trail() {
        let mut s = session(quiet_slice_level());
        flying_at(&mut s, Vec2::new(500.0, 500.0), Vec2::ZERO, false);
        for x in [480.0, 520.0] {
            let input = held_at(x, 600.0);
            tick(&mut s, &input, DT);
        }
        assert_eq!(s.flying.len(), 1);
        assert_eq!(s.meter.value(), 50);
    }

    #[test]
    fn test_slicing_bad_item_loses_one() {
        let mut s = session(quiet_slice_level());
        flying_at(&mut s, Vec2::new(500.0, 500.0), Vec2::ZERO, false);
        for y in [470.0, 530.0] {
            let input = held_at(500.0, y);
            tick(&mut s, &input, DT);
        }
        assert_eq!(s.meter.value(), 49);
        let halves: Vec<_> = s.fragments.iter().map(|f| f.half).collect();
        assert_eq!(halves, vec![crate::sim::FragmentHalf::Left, crate::sim::FragmentHalf::Right]);
    }

    #[test]
    fn test_trail_keeps_only_recent_samples() {
        let mut s = session(quiet_slice_level());
        let held = held_at(10.0, 10.0);
        for _ in 0..60 {
            tick(&mut s, &held, DT);
            let now = s.clock;
            assert!(s.trail.samples().all(|p| now - p.time <= TRAIL_WINDOW_SECS));
        }
        assert!(s.trail.len() <= 12);

        for _ in 0..12 {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert!(s.trail.is_empty());
    }

    #[test]
    fn test_escaped_good_flying_item_penalizes() {
        let mut s = session(quiet_slice_level());
        let edge = VIRTUAL_H + 199.0;
        flying_at(&mut s, Vec2::new(300.0, edge), Vec2::new(0.0, 600.0), true);
        flying_at(&mut s, Vec2::new(600.0, edge), Vec2::new(0.0, 600.0), false);
        tick(&mut s, &TickInput::default(), DT);
        assert!(s.flying.is_empty());
        assert_eq!(s.meter.value(), 49);
    }

    #[test]
    fn test_slice_spawner_bursts() {
        let mut s = session(slice_level());
        let mut frames = 0;
        while s.flying.is_empty() && frames < 120 {
            tick(&mut s, &TickInput::default(), DT);
            frames += 1;
        }
        // 950ms - 100ms, give or take float accumulation
        assert!((51..=52).contains(&frames), "first burst after {frames} frames");
        assert!((1..=3).contains(&s.flying.len()));
        for item in &s.flying {
            assert!(item.vel.y < 0.0);
            assert!(item.pos.x >= VIRTUAL_W * SLICE_LAUNCH_X_MIN - 520.0 * DT);
            assert!(item.pos.x <= VIRTUAL_W * SLICE_LAUNCH_X_MAX + 520.0 * DT);
            assert_eq!(item.radius, PLACEHOLDER_HIT_RADIUS);
        }
    }

    #[test]
    fn test_fragments_fall_away() {
        let mut s = session(quiet_slice_level());
        flying_at(&mut s, Vec2::new(500.0, 500.0), Vec2::ZERO, true);
        for x in [470.0, 530.0] {
            let input = held_at(x, 500.0);
            tick(&mut s, &input, DT);
        }
        assert_eq!(s.fragments.len(), 2);
        for _ in 0..180 {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert!(s.fragments.is_empty());
        assert_eq!(s.meter.value(), 51);
    }

    #[test]
    fn test_finished_session_is_frozen() {
        let mut s = session(quiet_catch_level());
        s.finish(Outcome::Failed);
        let clock = s.clock;
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.clock, clock);
        assert!(s.events.is_empty());
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut s = Session::new(catch_level(), 999, SpritePool::default());
            let input = TickInput {
                idle_mode: true,
                ..Default::default()
            };
            for _ in 0..600 {
                tick(&mut s, &input, DT);
            }
            (s.meter, s.items.len(), s.caught_good, s.caught_bad, s.dispenser.x)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_idle_mode_catches_items() {
        let mut s = session(catch_level());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..(20 * 60) {
            tick(&mut s, &input, DT);
        }
        assert!(s.caught_good > 0);
    }

    proptest! {
        #[test]
        fn prop_meter_and_time_stay_clamped(
            seed in any::<u64>(),
            slice in any::<bool>(),
            steps in prop::collection::vec(
                (
                    any::<bool>(),
                    any::<bool>(),
                    any::<bool>(),
                    0.0f32..1920.0,
                    0.0f32..1080.0,
                    0.0f32..0.1,
                ),
                1..300,
            ),
        ) {
            let level = if slice { slice_level() } else { catch_level() };
            let mut s = Session::new(level, seed, SpritePool::default());
            for (left, right, held, x, y, dt) in steps {
                let input = TickInput {
                    left,
                    right,
                    pointer: Vec2::new(x, y),
                    pointer_held: held,
                    idle_mode: false,
                };
                tick(&mut s, &input, dt);
                prop_assert!(s.meter.value() <= 100);
                prop_assert!(s.time_left >= 0.0);
                prop_assert!(s.player.x >= 0.0 && s.player.x <= VIRTUAL_W - s.player.w);
                prop_assert!(s.dispenser.x >= 0.0 && s.dispenser.x <= VIRTUAL_W - s.dispenser.w);
                prop_assert!(s.items.len() <= s.level.max_items);
                if s.meter.is_empty() || s.meter.is_full() {
                    prop_assert!(s.is_finished());
                }
            }
        }
    }
}
