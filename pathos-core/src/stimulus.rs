//! Emotional stimuli — discrete events offered to an actor for possible reaction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::emotion::Emotion;
use crate::types::{ActorId, Location};

/// Weight applied to secondary effects relative to the primary one.
pub const SECONDARY_EFFECT_WEIGHT: f32 = 0.7;

/// What kind of event a stimulus represents. Reaction rules are keyed on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    /// Someone greeted the actor.
    Greeting,
    /// The actor received a gift.
    Gift,
    /// The actor was praised.
    Compliment,
    /// The actor was insulted.
    Insult,
    /// The actor was attacked.
    Attack,
    /// The actor was threatened.
    Threat,
    /// The actor lost something or someone.
    Loss,
    /// Something unexpected happened.
    Surprise,
    /// A loud noise nearby.
    LoudNoise,
    /// A soothing influence.
    Calming,
    /// A named player skill.
    Skill(String),
    /// Emotion radiated by a nearby actor.
    Contagion(Emotion),
    /// Game-defined stimulus.
    Custom(String),
}

impl StimulusKind {
    /// Contagion stimulus derived from an emotion's primary tag.
    #[must_use]
    pub fn from_emotion(emotion: Emotion) -> Self {
        Self::Contagion(emotion.primary())
    }
}

impl fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill(name) => write!(f, "skill:{name}"),
            Self::Contagion(emotion) => write!(f, "contagion:{emotion}"),
            Self::Custom(name) => write!(f, "custom:{name}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// One emotional effect carried by a stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusEffect {
    /// Emotion the effect pushes toward.
    pub emotion: Emotion,
    /// Multiplier on the stimulus potency.
    pub intensity_multiplier: f32,
    /// Seconds a secondary effect lingers as a modifier.
    pub duration_modifier: f32,
}

impl StimulusEffect {
    /// Create an effect.
    #[must_use]
    pub fn new(emotion: Emotion, intensity_multiplier: f32, duration_modifier: f32) -> Self {
        Self {
            emotion,
            intensity_multiplier: intensity_multiplier.max(0.0),
            duration_modifier: duration_modifier.max(0.0),
        }
    }
}

impl Default for StimulusEffect {
    fn default() -> Self {
        Self {
            emotion: Emotion::NEUTRAL,
            intensity_multiplier: 1.0,
            duration_modifier: 0.0,
        }
    }
}

/// A transient event offered to an actor's emotion core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalStimulus {
    /// Kind of event; selects the reaction rule.
    pub kind: StimulusKind,
    /// Base potency in [0, 1].
    pub potency: f32,
    /// Actor that caused the stimulus, if any.
    pub source: Option<ActorId>,
    /// Intended recipient, if any. A mismatching recipient ignores it.
    pub target: Option<ActorId>,
    /// Where it happened.
    pub origin: Option<Location>,
    /// Primary effect.
    pub primary: StimulusEffect,
    /// Additional effects, weighted at [`SECONDARY_EFFECT_WEIGHT`].
    pub secondary: Vec<StimulusEffect>,
}

impl EmotionalStimulus {
    /// Create a stimulus with a neutral primary effect.
    #[must_use]
    pub fn new(kind: StimulusKind, potency: f32) -> Self {
        Self {
            kind,
            potency: potency.clamp(0.0, 1.0),
            source: None,
            target: None,
            origin: None,
            primary: StimulusEffect::default(),
            secondary: Vec::new(),
        }
    }

    /// Set the source actor.
    #[must_use]
    pub fn from_actor(mut self, source: ActorId) -> Self {
        self.source = Some(source);
        self
    }

    /// Address the stimulus to a specific actor.
    #[must_use]
    pub fn to_actor(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the spatial origin.
    #[must_use]
    pub fn at(mut self, origin: Location) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Replace the primary effect.
    #[must_use]
    pub fn with_primary(mut self, effect: StimulusEffect) -> Self {
        self.primary = effect;
        self
    }

    /// Add a secondary effect.
    #[must_use]
    pub fn with_secondary(mut self, effect: StimulusEffect) -> Self {
        self.secondary.push(effect);
        self
    }

    /// Potency after the primary effect's multiplier, clamped to [0, 1].
    #[must_use]
    pub fn effective_potency(&self) -> f32 {
        (self.potency * self.primary.intensity_multiplier).clamp(0.0, 1.0)
    }

    /// Potency of a secondary effect.
    #[must_use]
    pub fn secondary_potency(&self, effect: &StimulusEffect) -> f32 {
        (self.potency * effect.intensity_multiplier * SECONDARY_EFFECT_WEIGHT).clamp(0.0, 1.0)
    }

    /// Whether this stimulus is meant for `actor`.
    #[must_use]
    pub fn is_for(&self, actor: ActorId) -> bool {
        self.target.is_none_or(|target| target == actor)
    }
}
