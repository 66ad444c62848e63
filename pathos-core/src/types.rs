//! Core type definitions shared by every PATHOS module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for any actor (NPC, player, creature) in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random actor ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 3D position in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Location {
    /// Create a location from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another location.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Bit mask of world layers an actor lives on. Influence only reaches
/// targets whose layer intersects the configured mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// The default actor layer.
    pub const DEFAULT: Self = Self(1);

    /// Whether two masks share at least one layer.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Simulation timestamp: fixed-step tick plus elapsed simulated seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameTimestamp {
    /// Simulation step counter (monotonically increasing).
    pub tick: u64,
    /// Simulated seconds since the world started.
    pub seconds: f64,
    /// Corresponding wall-clock time (for save metadata and logs only).
    pub real_time: DateTime<Utc>,
}

impl GameTimestamp {
    /// Timestamp at the given step and simulated time.
    #[must_use]
    pub fn at(tick: u64, seconds: f64) -> Self {
        Self {
            tick,
            seconds,
            real_time: Utc::now(),
        }
    }

    /// The world origin.
    #[must_use]
    pub fn zero() -> Self {
        Self::at(0, 0.0)
    }

    /// Simulated seconds elapsed since `other` (never negative).
    #[must_use]
    pub fn seconds_since(&self, other: &Self) -> f64 {
        (self.seconds - other.seconds).max(0.0)
    }
}

// Wall-clock time is metadata; two timestamps are equal at the same step.
impl PartialEq for GameTimestamp {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.seconds == other.seconds
    }
}

impl Default for GameTimestamp {
    fn default() -> Self {
        Self::zero()
    }
}

/// Linear interpolation between `a` and `b` with `t` clamped to [0, 1].
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}
