//! Social Relationship Store — pairwise score and familiarity between actors.
//!
//! Relationships are keyed by the ordered pair `(observer, other)`: how the
//! observer regards the other actor. Inbound and outbound relationships of
//! one actor are distinct entries. Entries are created lazily at a neutral
//! score and low familiarity on first access and are never deleted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SocialConfig;
use crate::emotion::{Emotion, EmotionClass};
use crate::types::ActorId;

/// How `observer` regards `other`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialRelationship {
    /// Hostile (-1) to friendly (+1).
    pub score: f32,
    /// Accumulated interaction in [0, 1]. Only grows, except on reset.
    pub familiarity: f32,
}

impl SocialRelationship {
    /// Relationship with clamped values.
    #[must_use]
    pub fn new(score: f32, familiarity: f32) -> Self {
        Self {
            score: score.clamp(-1.0, 1.0),
            familiarity: familiarity.clamp(0.0, 1.0),
        }
    }

    /// Descriptive level of the score.
    #[must_use]
    pub fn level(&self) -> RelationshipLevel {
        RelationshipLevel::from_score(self.score)
    }
}

/// Relationship score bands for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipLevel {
    /// Score ≥ 0.7.
    Devoted,
    /// Score ≥ 0.3.
    Friendly,
    /// Score ≥ 0.1.
    Warm,
    /// -0.1 < score < 0.1.
    Neutral,
    /// Score ≤ -0.1.
    Cool,
    /// Score ≤ -0.3.
    Unfriendly,
    /// Score ≤ -0.7.
    Hostile,
}

impl RelationshipLevel {
    /// Classify a score.
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        if score >= 0.7 {
            Self::Devoted
        } else if score >= 0.3 {
            Self::Friendly
        } else if score >= 0.1 {
            Self::Warm
        } else if score > -0.1 {
            Self::Neutral
        } else if score > -0.3 {
            Self::Cool
        } else if score > -0.7 {
            Self::Unfriendly
        } else {
            Self::Hostile
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Devoted => "devoted companion",
            Self::Friendly => "friend",
            Self::Warm => "friendly acquaintance",
            Self::Neutral => "stranger",
            Self::Cool => "somewhat disliked",
            Self::Unfriendly => "distrusted",
            Self::Hostile => "enemy",
        }
    }
}

/// All pairwise relationships of one actor group.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    pairs: HashMap<(ActorId, ActorId), SocialRelationship>,
    config: SocialConfig,
}

impl RelationshipStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: SocialConfig) -> Self {
        Self {
            pairs: HashMap::new(),
            config,
        }
    }

    /// Whether relationships modulate influence.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn fresh(&self) -> SocialRelationship {
        SocialRelationship::new(0.0, self.config.initial_familiarity)
    }

    /// How `observer` regards `other`, creating the entry if needed.
    pub fn get_relationship(&mut self, observer: ActorId, other: ActorId) -> SocialRelationship {
        *self.entry(observer, other)
    }

    /// Read without creating. Unknown pairs report the fresh defaults.
    #[must_use]
    pub fn peek(&self, observer: ActorId, other: ActorId) -> SocialRelationship {
        self.pairs
            .get(&(observer, other))
            .copied()
            .unwrap_or_else(|| self.fresh())
    }

    /// Whether the pair has an entry.
    #[must_use]
    pub fn contains(&self, observer: ActorId, other: ActorId) -> bool {
        self.pairs.contains_key(&(observer, other))
    }

    fn entry(&mut self, observer: ActorId, other: ActorId) -> &mut SocialRelationship {
        let fresh = self.fresh();
        self.pairs.entry((observer, other)).or_insert(fresh)
    }

    /// Overwrite the score (clamped).
    pub fn set_score(&mut self, observer: ActorId, other: ActorId, score: f32) {
        self.entry(observer, other).score = score.clamp(-1.0, 1.0);
    }

    /// Multiplier applied to influence flowing from `source` to `target`:
    /// `clamp(1 + score, 0.5, 2.0) × base_multiplier`, where `score` is how
    /// the target regards the source.
    pub fn influence_modifier(&mut self, source: ActorId, target: ActorId) -> f32 {
        let score = self.entry(target, source).score;
        (1.0 + score).clamp(0.5, 2.0) * self.config.base_multiplier
    }

    /// Record that `observer` felt `emotion` at `intensity` because of `source`.
    ///
    /// Familiarity grows by `growth_rate × intensity`; the score shifts by the
    /// per-class delta × intensity. Both stay clamped.
    pub fn update_relationship(
        &mut self,
        observer: ActorId,
        source: ActorId,
        emotion: Emotion,
        intensity: f32,
    ) {
        let intensity = intensity.max(0.0);
        let delta = match emotion.class() {
            EmotionClass::Positive => self.config.positive_delta,
            EmotionClass::Negative => self.config.negative_delta,
            EmotionClass::Melancholy => self.config.melancholy_delta,
            EmotionClass::Neutral => 0.0,
        };
        let growth = self.config.growth_rate * intensity;
        let relationship = self.entry(observer, source);
        relationship.familiarity = (relationship.familiarity + growth).clamp(0.0, 1.0);
        relationship.score = (relationship.score + delta * intensity).clamp(-1.0, 1.0);
    }

    /// Explicitly reset a pair back to the fresh defaults.
    pub fn reset_relationship(&mut self, observer: ActorId, other: ActorId) {
        let fresh = self.fresh();
        self.pairs.insert((observer, other), fresh);
    }

    /// Every relationship held by `observer`.
    pub fn relationships_of(
        &self,
        observer: ActorId,
    ) -> impl Iterator<Item = (ActorId, SocialRelationship)> + '_ {
        self.pairs
            .iter()
            .filter(move |((from, _), _)| *from == observer)
            .map(|((_, to), relationship)| (*to, *relationship))
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
