//! Gesture trail for slice mode
//!
//! A sliding window of pointer samples, not a full history.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TRAIL_WINDOW_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSample {
    pub pos: Vec2,
    /// Simulated session time (seconds)
    pub time: f32,
}

/// Time-ordered pointer samples (oldest first)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureTrail {
    samples: VecDeque<TrailSample>,
}

impl GestureTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pos: Vec2, time: f32) {
        self.samples.push_back(TrailSample { pos, time });
    }

    /// Drop samples older than the retention window
    pub fn purge(&mut self, now: f32) {
        while let Some(front) = self.samples.front() {
            if now - front.time > TRAIL_WINDOW_SECS {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn points(&self) -> Vec<Vec2> {
        self.samples.iter().map(|s| s.pos).collect()
    }

    pub fn samples(&self) -> impl Iterator<Item = &TrailSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
