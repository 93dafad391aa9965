//! Collision tests for both game modes
//!
//! Catch mode uses plain axis-aligned rectangles. Slice mode tests an item's
//! center against each segment of the gesture trail.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::VIRTUAL_W;

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            w: size.x,
            h: size.y,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Overlap test; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Widen symmetrically by `extra`, clamped to the playfield's horizontal bounds
    pub fn widened(&self, extra: f32) -> Rect {
        if extra <= 0.0 {
            return *self;
        }
        let left = (self.x - extra / 2.0).max(0.0);
        let right = (self.right() + extra / 2.0).min(VIRTUAL_W);
        Rect {
            x: left,
            y: self.y,
            w: (right - left).max(0.0),
            h: self.h,
        }
    }
}

/// Distance from `p` to segment `a`-`b` (clamped projection)
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Slice test against a polyline of trail points.
///
/// Returns the direction of the last segment that passed within `radius` of
/// `center`, or `None` if nothing touched it. Zero-length segments are skipped.
pub fn slice_hit(center: Vec2, radius: f32, points: &[Vec2]) -> Option<Vec2> {
    let mut swipe = None;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dir = b - a;
        if dir == Vec2::ZERO {
            continue;
        }
        if point_segment_distance(center, a, b) <= radius {
            swipe = Some(dir);
        }
    }
    swipe
}

/// How a sliced item splits in two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitAxis {
    /// Horizontal cut: top and bottom halves
    Horizontal,
    /// Vertical cut: left and right halves
    Vertical,
}

impl SplitAxis {
    /// The cut follows the dominant axis of the swipe
    pub fn for_swipe(swipe: Vec2) -> Self {
        if swipe.x.abs() >= swipe.y.abs() {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        }
    }
}
