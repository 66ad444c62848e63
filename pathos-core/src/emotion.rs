//! Emotion tags, personality traits, and per-actor emotional state.
//!
//! Emotions are a *set* of base tags: composite emotions are unions of base
//! tags (`JOYFUL = HAPPY | EXCITED`). The empty set is `NEUTRAL`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// A set of emotion tags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct Emotion: u16 {
        /// Happiness, contentment.
        const HAPPY = 1 << 0;
        /// Sadness, grief.
        const SAD = 1 << 1;
        /// Anger, irritation.
        const ANGRY = 1 << 2;
        /// Fear, alarm.
        const FEARFUL = 1 << 3;
        /// Surprise, startle.
        const SURPRISED = 1 << 4;
        /// Disgust, revulsion.
        const DISGUSTED = 1 << 5;
        /// Calm, ease.
        const CALM = 1 << 6;
        /// Excitement, high arousal.
        const EXCITED = 1 << 7;
        /// Confusion, uncertainty.
        const CONFUSED = 1 << 8;
        /// Affection, attachment.
        const LOVING = 1 << 9;

        /// Happy and excited.
        const JOYFUL = Self::HAPPY.bits() | Self::EXCITED.bits();
        /// Sad but calm.
        const MELANCHOLY = Self::SAD.bits() | Self::CALM.bits();
        /// Angry and excited.
        const FURIOUS = Self::ANGRY.bits() | Self::EXCITED.bits();
        /// Afraid and confused.
        const ANXIOUS = Self::FEARFUL.bits() | Self::CONFUSED.bits();
    }
}

/// Coarse valence class of an emotion set, used by memory impressions and
/// relationship updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionClass {
    /// Happy / joyful / calm / loving.
    Positive,
    /// Sad / angry / fearful / disgusted.
    Negative,
    /// Sad and calm at once.
    Melancholy,
    /// No valence (neutral, surprise, confusion).
    Neutral,
}

impl Emotion {
    /// The empty set: no active emotion.
    pub const NEUTRAL: Self = Self::empty();

    /// Base tags in priority order, used to pick a primary tag.
    pub const BASE_TAGS: [Self; 10] = [
        Self::ANGRY,
        Self::FEARFUL,
        Self::SAD,
        Self::HAPPY,
        Self::DISGUSTED,
        Self::LOVING,
        Self::SURPRISED,
        Self::EXCITED,
        Self::CALM,
        Self::CONFUSED,
    ];

    const POSITIVE: Self = Self::HAPPY.union(Self::CALM).union(Self::LOVING);
    const NEGATIVE: Self = Self::SAD
        .union(Self::ANGRY)
        .union(Self::FEARFUL)
        .union(Self::DISGUSTED);

    /// Whether this is the neutral (empty) emotion.
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        self.is_empty()
    }

    /// Containment test. `NEUTRAL` is only "had" by a neutral set.
    #[must_use]
    pub fn has(self, tag: Self) -> bool {
        if tag.is_empty() {
            self.is_empty()
        } else {
            self.contains(tag)
        }
    }

    /// Valence class of this set.
    #[must_use]
    pub fn class(self) -> EmotionClass {
        if self.contains(Self::MELANCHOLY) && !self.intersects(Self::ANGRY | Self::FEARFUL) {
            EmotionClass::Melancholy
        } else if self.intersects(Self::NEGATIVE) {
            EmotionClass::Negative
        } else if self.intersects(Self::POSITIVE) {
            EmotionClass::Positive
        } else {
            EmotionClass::Neutral
        }
    }

    /// The highest-priority single base tag in this set (`NEUTRAL` if empty).
    #[must_use]
    pub fn primary(self) -> Self {
        Self::BASE_TAGS
            .into_iter()
            .find(|tag| self.contains(*tag))
            .unwrap_or(Self::NEUTRAL)
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NEUTRAL");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Personality Traits
// ---------------------------------------------------------------------------

/// Immutable personality parameters of an actor archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionTraits {
    /// Resting emotion the actor returns to.
    pub dominant: Emotion,
    /// Emotions that hit this actor harder (×1.5).
    pub vulnerable: Emotion,
    /// Emotions this actor shrugs off (×0.5).
    pub resistant: Emotion,
    /// 0 = volatile, 1 = stable. Stable actors decay slower.
    pub stability: f32,
    /// How much of a felt emotion is shown (0 = stoic, 1 = open).
    pub expressiveness: f32,
}

impl EmotionTraits {
    /// Create traits, clamping stability and expressiveness to [0, 1].
    #[must_use]
    pub fn new(
        dominant: Emotion,
        vulnerable: Emotion,
        resistant: Emotion,
        stability: f32,
        expressiveness: f32,
    ) -> Self {
        Self {
            dominant,
            vulnerable,
            resistant,
            stability,
            expressiveness,
        }
        .normalized()
    }

    /// Same traits with every ranged value clamped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.stability = self.stability.clamp(0.0, 1.0);
        self.expressiveness = self.expressiveness.clamp(0.0, 1.0);
        self
    }

    /// Combined resistance (×0.5), vulnerability (×1.5) and expressiveness
    /// factor for `emotion`.
    #[must_use]
    pub fn intensity_factor(&self, emotion: Emotion) -> f32 {
        let mut factor = self.expressiveness;
        if emotion.intersects(self.resistant) {
            factor *= 0.5;
        }
        if emotion.intersects(self.vulnerable) {
            factor *= 1.5;
        }
        factor
    }

    /// Apply [`intensity_factor`](Self::intensity_factor) to an incoming
    /// intensity. Result is clamped to [0, 1].
    #[must_use]
    pub fn filter_intensity(&self, emotion: Emotion, intensity: f32) -> f32 {
        (intensity * self.intensity_factor(emotion)).clamp(0.0, 1.0)
    }
}

impl Default for EmotionTraits {
    fn default() -> Self {
        Self {
            dominant: Emotion::NEUTRAL,
            vulnerable: Emotion::NEUTRAL,
            resistant: Emotion::NEUTRAL,
            stability: 0.5,
            expressiveness: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Emotional State
// ---------------------------------------------------------------------------

/// The live emotion of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Current emotion set.
    pub emotion: Emotion,
    /// Intensity in [0, 1].
    pub intensity: f32,
    /// Whether decay is externally slowed.
    pub decay_suspended: bool,
}

impl EmotionalState {
    /// Create a state, clamping intensity to [0, 1].
    #[must_use]
    pub fn new(emotion: Emotion, intensity: f32) -> Self {
        Self {
            emotion,
            intensity: intensity.clamp(0.0, 1.0),
            decay_suspended: false,
        }
    }

    /// Whether the current emotion contains `tag`.
    #[must_use]
    pub fn has(&self, tag: Emotion) -> bool {
        self.emotion.has(tag)
    }

    /// Whether the current emotion equals the actor's dominant trait.
    #[must_use]
    pub fn is_dominant(&self, traits: &EmotionTraits) -> bool {
        self.emotion == traits.dominant
    }

    /// Whether `other` differs in emotion or by more than `epsilon` in intensity.
    #[must_use]
    pub fn differs_from(&self, other: &Self, epsilon: f32) -> bool {
        self.emotion != other.emotion || (self.intensity - other.intensity).abs() > epsilon
    }
}
