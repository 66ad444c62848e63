//! Emotional Memory — a bounded, fading history of what an actor felt and who
//! made them feel it.
//!
//! Records are kept most-recent-first. Each record carries a potency that
//! fades on every decay pass independently of the live emotion; intense
//! memories fade slower:
//!
//!   potency -= decay_rate × dt × lerp(1.5, 0.5, intensity)
//!
//! Alongside the records, the memory keeps one scalar *impression* per other
//! actor in [-1, 1], nudged by every remembered event that actor caused.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::config::MemoryConfig;
use crate::emotion::{Emotion, EmotionClass};
use crate::events::{ChangeSource, EmotionChangeEvent};
use crate::types::{lerp, ActorId, GameTimestamp};

/// One remembered emotional change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionMemoryRecord {
    /// Emotion that resulted.
    pub emotion: Emotion,
    /// Intensity that resulted.
    pub intensity: f32,
    /// What caused the change.
    pub source: ChangeSource,
    /// Actor responsible, if any.
    pub source_actor: Option<ActorId>,
    /// When it happened.
    pub created_at: GameTimestamp,
    /// Remaining strength of the memory; forgotten at the threshold.
    pub potency: f32,
}

/// Per-actor emotional memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionMemory {
    records: VecDeque<EmotionMemoryRecord>,
    impressions: HashMap<ActorId, f32>,
    config: MemoryConfig,
    decay_rate: f32,
}

impl EmotionMemory {
    /// Create an empty memory that fades at `decay_rate` per second.
    #[must_use]
    pub fn new(config: MemoryConfig, decay_rate: f32) -> Self {
        Self {
            records: VecDeque::with_capacity(config.capacity.min(256)),
            impressions: HashMap::new(),
            config,
            decay_rate: decay_rate.max(0.0),
        }
    }

    /// Remember a state change.
    ///
    /// Skipped when nothing changed or the result is weaker than the
    /// configured minimum. Returns whether a record was stored.
    pub fn record_event(&mut self, change: &EmotionChangeEvent) -> bool {
        if change.new_intensity < self.config.min_record_intensity || !change.is_change(f32::EPSILON) {
            return false;
        }

        let source_actor = change.source_actor();
        self.records.push_front(EmotionMemoryRecord {
            emotion: change.new_emotion,
            intensity: change.new_intensity,
            source: change.source,
            source_actor,
            created_at: change.timestamp,
            potency: change.new_intensity,
        });
        while self.records.len() > self.config.capacity {
            self.records.pop_back();
        }

        if let Some(actor) = source_actor {
            let shift = change.new_intensity * self.config.impression_weight;
            let signed = match change.new_emotion.class() {
                EmotionClass::Positive => shift,
                EmotionClass::Negative => -shift,
                EmotionClass::Melancholy | EmotionClass::Neutral => 0.0,
            };
            let impression = self.impressions.entry(actor).or_insert(0.0);
            *impression = (*impression + signed).clamp(-1.0, 1.0);
        }
        true
    }

    /// Fade every record by `dt` seconds and forget those at or below the
    /// threshold. Returns how many were forgotten.
    pub fn decay(&mut self, dt: f32) -> usize {
        let threshold = self.config.forgetting_threshold;
        let rate = self.decay_rate;
        let before = self.records.len();
        self.records.retain_mut(|record| {
            let fade = rate * dt * lerp(1.5, 0.5, record.intensity);
            record.potency = (record.potency - fade).max(0.0);
            record.potency > threshold
        });
        before - self.records.len()
    }

    /// Records, most recent first.
    pub fn records(&self) -> impl Iterator<Item = &EmotionMemoryRecord> {
        self.records.iter()
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// The single tag with the most remaining potency among records caused
    /// by `actor`. `NEUTRAL` if there are none.
    #[must_use]
    pub fn dominant_emotion_toward(&self, actor: ActorId) -> Emotion {
        let mut totals: HashMap<Emotion, f32> = HashMap::new();
        for record in self.records.iter().filter(|r| r.source_actor == Some(actor)) {
            for tag in Emotion::BASE_TAGS {
                if record.emotion.contains(tag) {
                    *totals.entry(tag).or_insert(0.0) += record.potency;
                }
            }
        }
        // Ties resolve by tag priority so the answer is deterministic.
        Emotion::BASE_TAGS
            .into_iter()
            .filter_map(|tag| totals.get(&tag).map(|total| (tag, *total)))
            .rev()
            .max_by_key(|(_, total)| OrderedFloat(*total))
            .map_or(Emotion::NEUTRAL, |(tag, _)| tag)
    }

    /// Aggregate sentiment toward `actor` in [-1, 1]; 0 if unknown.
    #[must_use]
    pub fn impression_of(&self, actor: ActorId) -> f32 {
        self.impressions.get(&actor).copied().unwrap_or(0.0)
    }

    /// Whether `actor` caused `emotion` within the last `window` seconds.
    #[must_use]
    pub fn has_caused_emotion_recently(
        &self,
        actor: ActorId,
        emotion: Emotion,
        window: f64,
        now: &GameTimestamp,
    ) -> bool {
        self.records.iter().any(|record| {
            record.source_actor == Some(actor)
                && record.emotion.has(emotion)
                && now.seconds_since(&record.created_at) <= window
        })
    }

    /// Forget everything, impressions included.
    pub fn clear(&mut self) {
        self.records.clear();
        self.impressions.clear();
    }
}
