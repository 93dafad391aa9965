//! Interval-driven spawn timers

use serde::{Deserialize, Serialize};

/// Millisecond accumulator that fires once per interval and resets to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    pub elapsed_ms: f32,
}

impl IntervalTimer {
    /// Advance by `dt` seconds; true when the interval was crossed
    pub fn advance(&mut self, dt: f32, interval_ms: f32) -> bool {
        self.elapsed_ms += dt * 1000.0;
        if self.elapsed_ms >= interval_ms {
            self.elapsed_ms = 0.0;
            true
        } else {
            false
        }
    }
}

/// Independent accumulators for items and power-up attempts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    pub items: IntervalTimer,
    pub powerups: IntervalTimer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_and_resets() {
        let mut t = IntervalTimer::default();
        assert!(!t.advance(0.3, 650.0));
        assert!(!t.advance(0.3, 650.0));
        assert!(t.advance(0.1, 650.0));
        assert_eq!(t.elapsed_ms, 0.0);
        // Leftover time is discarded on fire
        assert!(!t.advance(0.6, 650.0));
    }

    #[test]
    fn test_zero_interval_fires_every_frame() {
        let mut t = IntervalTimer::default();
        assert!(t.advance(0.016, 0.0));
        assert!(t.advance(0.016, 0.0));
    }
}
