//! Meter, background stages and session outcomes

use serde::{Deserialize, Serialize};

use crate::consts::{METER_MAX, START_METER};

/// Meter thresholds for the six background/audio stages
pub const STAGE_THRESHOLDS: [u8; 6] = [0, 20, 40, 60, 80, 100];

/// Percentage meter, always in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Meter(u8);

impl Default for Meter {
    fn default() -> Self {
        Self(START_METER)
    }
}

impl Meter {
    pub fn new(value: u8) -> Self {
        Self(value.min(METER_MAX))
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Add, capped at 100
    pub fn gain(&mut self, amount: u8) {
        self.0 = self.0.saturating_add(amount).min(METER_MAX);
    }

    /// Subtract, floored at 0
    pub fn lose(&mut self, amount: u8) {
        self.0 = self.0.saturating_sub(amount);
    }

    /// Fraction of the way to 100%
    pub fn fraction(self) -> f32 {
        self.0 as f32 / METER_MAX as f32
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full(self) -> bool {
        self.0 >= METER_MAX
    }
}

/// Highest stage whose threshold does not exceed the meter
pub fn stage_for_meter(meter: Meter) -> usize {
    STAGE_THRESHOLDS
        .iter()
        .rposition(|&t| meter.value() >= t)
        .unwrap_or(0)
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Countdown reached zero
    TimeUp,
    /// Meter hit 0%
    Failed,
    /// Meter hit 100%
    Complete,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::TimeUp => "Time up",
            Outcome::Failed => "Level failed, hit 0%",
            Outcome::Complete => "Level complete, hit 100%",
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Running,
    Finished(Outcome),
}
