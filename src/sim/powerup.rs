//! Power-up kinds and the active-effect table
//!
//! Instant kinds apply once and only leave a short badge behind. Timed kinds
//! stay in the table until their timer runs out; everything they change
//! (catch width, fall speed, meter gain, magnet pull) is derived from the
//! table each frame rather than toggled on and off.

use serde::{Deserialize, Serialize};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    MoreTime,
    LessTime,
    BiggerBasket,
    LessPercentage,
    MorePercentage,
    DoublePercentage,
    Magnet,
    Stopwatch,
}

impl PowerUpKind {
    pub const COUNT: usize = 8;

    pub const ALL: [PowerUpKind; Self::COUNT] = [
        PowerUpKind::MoreTime,
        PowerUpKind::LessTime,
        PowerUpKind::BiggerBasket,
        PowerUpKind::LessPercentage,
        PowerUpKind::MorePercentage,
        PowerUpKind::DoublePercentage,
        PowerUpKind::Magnet,
        PowerUpKind::Stopwatch,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Timed kinds linger and revert on expiry
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            PowerUpKind::BiggerBasket
                | PowerUpKind::DoublePercentage
                | PowerUpKind::Magnet
                | PowerUpKind::Stopwatch
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::MoreTime => "More time",
            PowerUpKind::LessTime => "Less time",
            PowerUpKind::BiggerBasket => "Bigger basket",
            PowerUpKind::LessPercentage => "Less percentage",
            PowerUpKind::MorePercentage => "More percentage",
            PowerUpKind::DoublePercentage => "Double percentage",
            PowerUpKind::Magnet => "Magnet",
            PowerUpKind::Stopwatch => "Stopwatch",
        }
    }

    /// Short text drawn on the placeholder badge
    pub fn badge_text(self) -> &'static str {
        match self {
            PowerUpKind::MoreTime => "+5s",
            PowerUpKind::LessTime => "-5s",
            PowerUpKind::BiggerBasket => "B",
            PowerUpKind::LessPercentage => "-2%",
            PowerUpKind::MorePercentage => "+5%",
            PowerUpKind::DoublePercentage => "x2",
            PowerUpKind::Magnet => "M",
            PowerUpKind::Stopwatch => "S",
        }
    }

    pub fn icon_path(self) -> &'static str {
        match self {
            PowerUpKind::MoreTime => "pu_more_time.png",
            PowerUpKind::LessTime => "pu_less_time.png",
            PowerUpKind::BiggerBasket => "pu_bigger_basket.png",
            PowerUpKind::LessPercentage => "pu_less_pct.png",
            PowerUpKind::MorePercentage => "pu_more_pct.png",
            PowerUpKind::DoublePercentage => "pu_double_pct.png",
            PowerUpKind::Magnet => "pu_magnet.png",
            PowerUpKind::Stopwatch => "pu_stopwatch.png",
        }
    }

    /// Placeholder color (RGB)
    pub fn fallback_color(self) -> [u8; 3] {
        match self {
            PowerUpKind::MoreTime => [60, 200, 90],
            PowerUpKind::LessTime => [230, 70, 70],
            PowerUpKind::BiggerBasket => [255, 215, 0],
            PowerUpKind::LessPercentage => [220, 90, 220],
            PowerUpKind::MorePercentage => [90, 230, 230],
            PowerUpKind::DoublePercentage => [255, 160, 60],
            PowerUpKind::Magnet => [100, 200, 255],
            PowerUpKind::Stopwatch => [150, 100, 220],
        }
    }
}

/// Remaining seconds per power-up kind (None = inactive)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    timers: [Option<f32>; PowerUpKind::COUNT],
}

impl ActiveEffects {
    /// Start or refresh a kind. Re-activation resets the timer, never stacks it.
    pub fn activate(&mut self, kind: PowerUpKind, seconds: f32) {
        self.timers[kind.index()] = Some(seconds);
    }

    #[inline]
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.timers[kind.index()].is_some()
    }

    pub fn remaining(&self, kind: PowerUpKind) -> Option<f32> {
        self.timers[kind.index()]
    }

    /// Count down every entry and drop the ones that ran out.
    /// Returns the kinds that expired this frame.
    pub fn tick(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            if let Some(t) = self.timers[kind.index()].as_mut() {
                *t -= dt;
                if *t <= 0.0 {
                    self.timers[kind.index()] = None;
                    expired.push(kind);
                }
            }
        }
        expired
    }

    /// Active entries in kind order
    pub fn iter(&self) -> impl Iterator<Item = (PowerUpKind, f32)> + '_ {
        PowerUpKind::ALL
            .into_iter()
            .filter_map(|k| self.timers[k.index()].map(|t| (k, t)))
    }

    pub fn clear(&mut self) {
        self.timers = [None; PowerUpKind::COUNT];
    }

    pub fn double_gain(&self) -> bool {
        self.is_active(PowerUpKind::DoublePercentage)
    }

    pub fn magnet(&self) -> bool {
        self.is_active(PowerUpKind::Magnet)
    }

    pub fn slow_motion(&self) -> bool {
        self.is_active(PowerUpKind::Stopwatch)
    }

    pub fn enlarged_basket(&self) -> bool {
        self.is_active(PowerUpKind::BiggerBasket)
    }
}
