//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Simulated time only (no wall clock)
//! - Seeded RNG only
//! - Entity collections iterate in spawn order
//! - No rendering, audio or filesystem access

pub mod collision;
pub mod powerup;
pub mod progress;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod trail;

pub use collision::{Rect, SplitAxis, point_segment_distance, slice_hit};
pub use powerup::{ActiveEffects, PowerUpKind};
pub use progress::{Meter, Outcome, STAGE_THRESHOLDS, SessionPhase, stage_for_meter};
pub use spawn::{IntervalTimer, Spawner};
pub use state::{
    Dispenser, FallingItem, FlyingItem, FragmentHalf, GameEvent, Player, PowerUpDrop, Session,
    SliceFragment,
};
pub use tick::{TickInput, tick};
pub use trail::{GestureTrail, TrailSample};
