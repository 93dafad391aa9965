//! Frame pacing

use std::time::{Duration, Instant};

use crate::consts::MAX_FRAME_DT;

/// Yields capped per-frame deltas and sleeps to hold a target rate
#[derive(Debug)]
pub struct FrameClock {
    target: Duration,
    last: Instant,
    // FPS tracking
    frame_times: [f32; 60],
    frame_index: usize,
}

impl FrameClock {
    pub fn new(target_fps: u32) -> Self {
        Self {
            target: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            last: Instant::now(),
            frame_times: [0.0; 60],
            frame_index: 0,
        }
    }

    /// Wait out the rest of the frame, then return the elapsed seconds
    pub fn tick(&mut self) -> f32 {
        let spent = self.last.elapsed();
        if spent < self.target {
            std::thread::sleep(self.target - spent);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.record(dt)
    }

    /// Store a raw frame delta and return it capped
    fn record(&mut self, dt: f32) -> f32 {
        self.frame_times[self.frame_index] = dt;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();
        dt.clamp(0.0, MAX_FRAME_DT)
    }

    /// Average rate over the last 60 frames (0 until a frame was recorded)
    pub fn fps(&self) -> u32 {
        let (sum, n) = self
            .frame_times
            .iter()
            .filter(|&&t| t > 0.0)
            .fold((0.0f32, 0u32), |(s, n), &t| (s + t, n + 1));
        if n == 0 || sum <= 0.0 {
            0
        } else {
            (n as f32 / sum).round() as u32
        }
    }
}
