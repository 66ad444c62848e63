//! Time-bounded intensity modifiers and the per-actor ledger that holds them.
//!
//! Modifiers are additive deltas stacked on the rule-derived base state in
//! insertion order. Each modifier also says what it does to the visible
//! emotion: keep it, replace it (the last replacing modifier wins) or blend
//! its tags into it.

use serde::{Deserialize, Serialize};

use crate::emotion::{Emotion, EmotionalState};

/// How a modifier touches the visible emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierMode {
    /// Leave the emotion alone; only the intensity delta applies.
    Keep,
    /// Show the modifier's emotion, `NEUTRAL` included.
    #[default]
    Replace,
    /// Union the modifier's tags into the emotion.
    Blend,
}

/// A time-bounded adjustment owned by one actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveModifier {
    /// Target emotion. Ignored in [`ModifierMode::Keep`].
    pub emotion: Emotion,
    /// Additive intensity delta.
    pub intensity_delta: f32,
    /// Seconds left. Non-positive means expired.
    pub remaining: f32,
    /// Whether decay is slowed while this modifier lives.
    pub blocks_decay: bool,
    /// Effect on the visible emotion.
    #[serde(default)]
    pub mode: ModifierMode,
}

impl ActiveModifier {
    /// A modifier that shows `emotion` while it lives.
    #[must_use]
    pub fn new(emotion: Emotion, intensity_delta: f32, duration: f32) -> Self {
        Self {
            emotion,
            intensity_delta,
            remaining: duration,
            blocks_decay: false,
            mode: ModifierMode::Replace,
        }
    }

    /// A modifier that shifts intensity and leaves the emotion alone.
    #[must_use]
    pub fn intensity(intensity_delta: f32, duration: f32) -> Self {
        Self {
            mode: ModifierMode::Keep,
            ..Self::new(Emotion::NEUTRAL, intensity_delta, duration)
        }
    }

    /// A modifier that adds `emotion`'s tags on top of the current emotion.
    #[must_use]
    pub fn blended(emotion: Emotion, intensity_delta: f32, duration: f32) -> Self {
        Self {
            mode: ModifierMode::Blend,
            ..Self::new(emotion, intensity_delta, duration)
        }
    }

    /// A modifier that only slows decay for `duration` seconds.
    #[must_use]
    pub fn sustain(duration: f32) -> Self {
        Self::intensity(0.0, duration).blocking_decay()
    }

    /// Mark the modifier as decay-blocking.
    #[must_use]
    pub fn blocking_decay(mut self) -> Self {
        self.blocks_decay = true;
        self
    }

    /// Whether the modifier has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Outcome of aging the ledger by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeReport {
    /// Modifiers that were live and ran out during this tick.
    pub expired_live: usize,
    /// Modifiers that were already expired when aged (dropped silently).
    pub dropped_stale: usize,
}

/// Ordered list of active modifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierLedger {
    entries: Vec<ActiveModifier>,
}

impl ModifierLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier.
    pub fn push(&mut self, modifier: ActiveModifier) {
        self.entries.push(modifier);
    }

    /// Live (non-expired) modifiers in insertion order.
    pub fn live(&self) -> impl Iterator<Item = &ActiveModifier> {
        self.entries.iter().filter(|m| !m.is_expired())
    }

    /// Number of entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any live modifier slows decay.
    #[must_use]
    pub fn blocks_decay(&self) -> bool {
        self.live().any(|m| m.blocks_decay)
    }

    /// Sum of live intensity deltas.
    #[must_use]
    pub fn net_delta(&self) -> f32 {
        self.live().map(|m| m.intensity_delta).sum()
    }

    /// Stack every live modifier on `base`.
    #[must_use]
    pub fn resolve(&self, base: &EmotionalState) -> EmotionalState {
        let mut emotion = base.emotion;
        let mut intensity = base.intensity;
        for modifier in self.live() {
            match modifier.mode {
                ModifierMode::Keep => {}
                ModifierMode::Replace => emotion = modifier.emotion,
                ModifierMode::Blend => emotion |= modifier.emotion,
            }
            intensity += modifier.intensity_delta;
        }
        EmotionalState {
            emotion,
            intensity: intensity.clamp(0.0, 1.0),
            decay_suspended: base.decay_suspended,
        }
    }

    /// Age every modifier by `dt` seconds and drop expired ones.
    pub fn age(&mut self, dt: f32) -> AgeReport {
        let mut report = AgeReport::default();
        self.entries.retain_mut(|modifier| {
            if modifier.is_expired() {
                report.dropped_stale += 1;
                return false;
            }
            modifier.remaining -= dt;
            if modifier.is_expired() {
                report.expired_live += 1;
                false
            } else {
                true
            }
        });
        report
    }

    /// Remove every modifier.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
