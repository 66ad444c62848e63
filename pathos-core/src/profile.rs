//! Emotion profiles — per-archetype configuration shared read-only by every
//! actor of that archetype.
//!
//! A profile bundles the personality traits, baseline, decay and sensitivity
//! parameters, the ordered reaction-rule table, and the threshold / combo
//! behavior tables. Profiles are usually loaded from TOML:
//!
//! ```toml
//! [[profile]]
//! name = "villager"
//! baseline_intensity = 0.3
//!
//! [profile.traits]
//! dominant = "CALM"
//! resistant = "ANGRY"
//!
//! [[profile.rules]]
//! stimulus = "gift"
//! resulting = "HAPPY"
//! intensity_delta = 0.5
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::emotion::{Emotion, EmotionTraits};
use crate::error::{PathosError, Result};
use crate::stimulus::StimulusKind;

// ---------------------------------------------------------------------------
// Reaction Rules
// ---------------------------------------------------------------------------

/// Maps a stimulus kind (and optionally the current emotion) to an emotion change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRule {
    /// Stimulus kind this rule reacts to.
    pub stimulus: StimulusKind,
    /// Emotion the actor must currently have. `None` = wildcard.
    #[serde(default)]
    pub required_emotion: Option<Emotion>,
    /// Emotion produced by the reaction.
    #[serde(default)]
    pub resulting: Emotion,
    /// Intensity change in [-1, 1], scaled by potency and sensitivity.
    #[serde(default)]
    pub intensity_delta: f32,
    /// Upper bound on the intensity this reaction can produce.
    #[serde(default = "default_max_intensity")]
    pub max_intensity: f32,
    /// Replace the current emotion (`true`) or modify its intensity (`false`).
    #[serde(default = "default_true", rename = "override")]
    pub override_current: bool,
    /// Seconds before the reaction is applied.
    #[serde(default)]
    pub reaction_delay: f32,
    /// Seconds during which decay is slowed after this reaction.
    #[serde(default)]
    pub sustained_duration: f32,
}

impl ReactionRule {
    /// Overriding rule with no delay and no sustain.
    #[must_use]
    pub fn new(stimulus: StimulusKind, resulting: Emotion, intensity_delta: f32) -> Self {
        Self {
            stimulus,
            required_emotion: None,
            resulting,
            intensity_delta: intensity_delta.clamp(-1.0, 1.0),
            max_intensity: 1.0,
            override_current: true,
            reaction_delay: 0.0,
            sustained_duration: 0.0,
        }
    }

    /// Only apply while the actor feels `emotion`.
    #[must_use]
    pub fn when(mut self, emotion: Emotion) -> Self {
        self.required_emotion = Some(emotion);
        self
    }

    /// Cap the resulting intensity.
    #[must_use]
    pub fn capped_at(mut self, max_intensity: f32) -> Self {
        self.max_intensity = max_intensity.clamp(0.0, 1.0);
        self
    }

    /// Modify the current emotion instead of replacing it.
    #[must_use]
    pub fn modifying(mut self) -> Self {
        self.override_current = false;
        self
    }

    /// Delay the reaction by `seconds`.
    #[must_use]
    pub fn delayed(mut self, seconds: f32) -> Self {
        self.reaction_delay = seconds.max(0.0);
        self
    }

    /// Slow decay for `seconds` after the reaction.
    #[must_use]
    pub fn sustained(mut self, seconds: f32) -> Self {
        self.sustained_duration = seconds.max(0.0);
        self
    }

    /// Whether this rule is keyed to a specific current emotion.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.required_emotion.is_none()
    }

    fn normalized(mut self) -> Self {
        self.intensity_delta = self.intensity_delta.clamp(-1.0, 1.0);
        self.max_intensity = self.max_intensity.clamp(0.0, 1.0);
        self.reaction_delay = self.reaction_delay.max(0.0);
        self.sustained_duration = self.sustained_duration.max(0.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Threshold & Combo Behaviors
// ---------------------------------------------------------------------------

/// Side-effect trigger fired when an emotion reaches a minimum intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBehavior {
    /// Identifier handed to collaborators (e.g. `"rage_glow"`).
    pub name: String,
    /// Emotion that must be present.
    pub emotion: Emotion,
    /// Minimum intensity.
    pub min_intensity: f32,
    /// Fire at most once per actor.
    #[serde(default)]
    pub one_shot: bool,
}

impl ThresholdBehavior {
    /// Whether this behavior matches a committed state.
    #[must_use]
    pub fn matches(&self, emotion: Emotion, intensity: f32) -> bool {
        emotion.has(self.emotion) && self.min_intensity <= intensity
    }
}

/// Trigger fired when two emotions co-occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboBehavior {
    /// Identifier handed to collaborators.
    pub name: String,
    /// First component emotion.
    pub first: Emotion,
    /// Second component emotion.
    pub second: Emotion,
    /// The distinct emotion the combination represents.
    pub resulting: Emotion,
    /// Minimum intensity.
    #[serde(default)]
    pub min_intensity: f32,
    /// Fire at most once per actor.
    #[serde(default)]
    pub one_shot: bool,
}

impl ComboBehavior {
    /// Whether both components are present at sufficient intensity.
    #[must_use]
    pub fn matches(&self, emotion: Emotion, intensity: f32) -> bool {
        !self.first.is_empty()
            && !self.second.is_empty()
            && emotion.contains(self.first | self.second)
            && self.min_intensity <= intensity
    }
}

// ---------------------------------------------------------------------------
// Emotion Profile
// ---------------------------------------------------------------------------

/// Per-archetype emotion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    /// Archetype name.
    pub name: String,
    /// Personality traits.
    #[serde(default)]
    pub traits: EmotionTraits,
    /// Intensity of the dominant emotion at rest.
    #[serde(default = "default_baseline")]
    pub baseline_intensity: f32,
    /// How fast emotional memories of this actor fade, in [0.01, 1].
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f32,
    /// Multiplier on every reaction delta, in [0.5, 2].
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// How quickly the actor settles back onto its baseline, in [0, 1].
    #[serde(default)]
    pub resilience: f32,
    /// Ordered reaction rules.
    #[serde(default)]
    pub rules: Vec<ReactionRule>,
    /// Threshold behaviors.
    #[serde(default)]
    pub thresholds: Vec<ThresholdBehavior>,
    /// Combo behaviors.
    #[serde(default)]
    pub combos: Vec<ComboBehavior>,
}

impl EmotionProfile {
    /// Empty profile with default parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: EmotionTraits::default(),
            baseline_intensity: default_baseline(),
            decay_rate: default_decay_rate(),
            sensitivity: default_sensitivity(),
            resilience: 0.0,
            rules: Vec::new(),
            thresholds: Vec::new(),
            combos: Vec::new(),
        }
    }

    /// Set traits.
    #[must_use]
    pub fn with_traits(mut self, traits: EmotionTraits) -> Self {
        self.traits = traits.normalized();
        self
    }

    /// Set baseline intensity.
    #[must_use]
    pub fn with_baseline(mut self, intensity: f32) -> Self {
        self.baseline_intensity = intensity.clamp(0.0, 1.0);
        self
    }

    /// Set decay rate.
    #[must_use]
    pub fn with_decay_rate(mut self, rate: f32) -> Self {
        self.decay_rate = rate.clamp(0.01, 1.0);
        self
    }

    /// Set sensitivity.
    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity.clamp(0.5, 2.0);
        self
    }

    /// Set resilience.
    #[must_use]
    pub fn with_resilience(mut self, resilience: f32) -> Self {
        self.resilience = resilience.clamp(0.0, 1.0);
        self
    }

    /// Append a reaction rule.
    #[must_use]
    pub fn with_rule(mut self, rule: ReactionRule) -> Self {
        self.rules.push(rule.normalized());
        self
    }

    /// Append a threshold behavior.
    #[must_use]
    pub fn with_threshold(mut self, behavior: ThresholdBehavior) -> Self {
        self.thresholds.push(behavior);
        self
    }

    /// Append a combo behavior.
    #[must_use]
    pub fn with_combo(mut self, behavior: ComboBehavior) -> Self {
        self.combos.push(behavior);
        self
    }

    /// Same profile with every ranged value clamped into its legal range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.traits = self.traits.normalized();
        self.baseline_intensity = self.baseline_intensity.clamp(0.0, 1.0);
        self.decay_rate = self.decay_rate.clamp(0.01, 1.0);
        self.sensitivity = self.sensitivity.clamp(0.5, 2.0);
        self.resilience = self.resilience.clamp(0.0, 1.0);
        self.rules = self.rules.into_iter().map(ReactionRule::normalized).collect();
        for threshold in &mut self.thresholds {
            threshold.min_intensity = threshold.min_intensity.clamp(0.0, 1.0);
        }
        for combo in &mut self.combos {
            combo.min_intensity = combo.min_intensity.clamp(0.0, 1.0);
        }
        self
    }

    /// Resolve the rule for a stimulus kind given the current emotion.
    ///
    /// A rule whose required emotion is present in `current` wins over a
    /// wildcard rule for the same kind; ties go to table order.
    #[must_use]
    pub fn find_rule(&self, kind: &StimulusKind, current: Emotion) -> Option<(usize, &ReactionRule)> {
        let mut wildcard = None;
        for (index, rule) in self.rules.iter().enumerate() {
            if &rule.stimulus != kind {
                continue;
            }
            match rule.required_emotion {
                Some(required) if current.has(required) => return Some((index, rule)),
                Some(_) => {}
                None => {
                    if wildcard.is_none() {
                        wildcard = Some((index, rule));
                    }
                }
            }
        }
        wildcard
    }

    /// Rule by table index (used by deferred reactions).
    #[must_use]
    pub fn rule(&self, index: usize) -> Option<&ReactionRule> {
        self.rules.get(index)
    }
}

// ---------------------------------------------------------------------------
// Profile Library
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profile: Vec<EmotionProfile>,
}

/// Named, shared profiles. Each profile is immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct ProfileLibrary {
    profiles: HashMap<String, Arc<EmotionProfile>>,
}

impl ProfileLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `[[profile]]` table from a TOML string.
    ///
    /// # Errors
    /// Returns `PathosError::Config` on invalid TOML or duplicate names.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: ProfileFile =
            toml::from_str(toml_str).map_err(|e| PathosError::Config(e.to_string()))?;
        let mut library = Self::new();
        for profile in file.profile {
            if library.profiles.contains_key(&profile.name) {
                return Err(PathosError::Config(format!(
                    "duplicate emotion profile '{}'",
                    profile.name
                )));
            }
            library.insert(profile);
        }
        Ok(library)
    }

    /// Load profiles from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Add (or replace) a profile, normalizing its values.
    pub fn insert(&mut self, profile: EmotionProfile) -> Arc<EmotionProfile> {
        let profile = Arc::new(profile.normalized());
        self.profiles.insert(profile.name.clone(), Arc::clone(&profile));
        profile
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    /// Returns `PathosError::ProfileNotFound` if absent.
    pub fn get(&self, name: &str) -> Result<Arc<EmotionProfile>> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| PathosError::ProfileNotFound(name.to_string()))
    }

    /// Number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_max_intensity() -> f32 { 1.0 }
fn default_baseline() -> f32 { 0.3 }
fn default_decay_rate() -> f32 { 0.1 }
fn default_sensitivity() -> f32 { 1.0 }
