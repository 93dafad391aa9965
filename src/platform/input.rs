//! Raw platform input to per-frame `TickInput`

use std::collections::HashSet;

use crate::sim::TickInput;
use crate::window_to_virtual;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    A,
    D,
    /// Back out one screen
    Escape,
    /// Toggle autoplay
    I,
}

/// Whatever the window layer reports for one frame
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pub held: HashSet<Key>,
    /// Keys pressed this frame (edge-triggered)
    pub pressed: HashSet<Key>,
    /// Pointer in window pixels
    pub pointer_px: (f32, f32),
    pub pointer_down: bool,
    /// Current window size in pixels
    pub window_size: (f32, f32),
}

impl RawInput {
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Map raw input into playfield terms
pub fn normalize(raw: &RawInput, idle_mode: bool) -> TickInput {
    let held = |a: Key, b: Key| raw.held.contains(&a) || raw.held.contains(&b);
    let (px, py) = raw.pointer_px;
    let (w, h) = raw.window_size;
    TickInput {
        left: held(Key::Left, Key::A),
        right: held(Key::Right, Key::D),
        pointer: window_to_virtual(px, py, w, h),
        pointer_held: raw.pointer_down,
        idle_mode,
    }
}
