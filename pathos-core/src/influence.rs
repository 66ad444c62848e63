//! Emotional influence — proximity-based contagion between actors.
//!
//! A pass works on an immutable snapshot of the live, enabled actors and
//! produces a list of synthetic stimuli. Delivering them is the caller's job
//! and happens only after planning has finished, so nothing in the snapshot
//! can change mid-pass.
//!
//! For a source with intensity `i` the reach is `base_radius × i`. A target
//! at distance `d` inside the reach receives
//!
//!   effective = i × (1 − clamp(d / reach, 0, 1)) × intensity_falloff
//!
//! multiplied by the relationship modifier when the social store is enabled.

use tracing::debug;

use crate::config::InfluenceConfig;
use crate::emotion::Emotion;
use crate::relationship::RelationshipStore;
use crate::scheduler::IntervalClock;
use crate::stimulus::{EmotionalStimulus, StimulusKind};
use crate::types::{ActorId, LayerMask, Location};

/// What the influence pass needs to know about one actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    /// Actor id.
    pub id: ActorId,
    /// Position at snapshot time.
    pub location: Location,
    /// Layers the actor is on.
    pub layer: LayerMask,
    /// Visible emotion.
    pub emotion: Emotion,
    /// Visible intensity.
    pub intensity: f32,
}

/// One planned delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Influence {
    /// Radiating actor.
    pub source: ActorId,
    /// Receiving actor.
    pub target: ActorId,
    /// Transmitted intensity after the relationship modifier.
    pub effective_intensity: f32,
    /// Stimulus to feed into the target's core.
    pub stimulus: EmotionalStimulus,
}

/// `1 − clamp(distance / reach, 0, 1)`; zero for a non-positive reach.
#[must_use]
pub fn distance_factor(distance: f32, reach: f32) -> f32 {
    if reach <= 0.0 {
        return 0.0;
    }
    1.0 - (distance / reach).clamp(0.0, 1.0)
}

/// Transmitted intensity before any relationship modifier.
#[must_use]
pub fn effective_intensity(source_intensity: f32, distance: f32, config: &InfluenceConfig) -> f32 {
    let reach = config.base_radius * source_intensity;
    source_intensity * distance_factor(distance, reach) * config.intensity_falloff
}

/// Periodic influence driver for one actor group.
#[derive(Debug, Clone)]
pub struct InfluenceSystem {
    config: InfluenceConfig,
    clock: IntervalClock,
}

impl InfluenceSystem {
    /// Create a driver.
    #[must_use]
    pub fn new(config: InfluenceConfig) -> Self {
        Self {
            config,
            clock: IntervalClock::new(),
        }
    }

    /// Active settings.
    #[must_use]
    pub fn config(&self) -> &InfluenceConfig {
        &self.config
    }

    /// Whether passes run at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Advance the interval timer by `dt` seconds. Returns how many passes
    /// are now due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.config.enabled || self.config.interval <= 0.0 {
            return 0;
        }
        self.clock.advance(dt, self.config.interval)
    }

    /// Plan one pass over `actors`.
    ///
    /// Pairs are visited in snapshot order, source-major. Relationship
    /// modifiers are read and the target's view of the source is updated
    /// as each pair is planned.
    pub fn plan(
        &self,
        actors: &[ActorSnapshot],
        relationships: &mut RelationshipStore,
    ) -> Vec<Influence> {
        let mut planned = Vec::new();
        let mut sources = 0usize;

        for source in actors {
            if source.intensity < self.config.min_source_intensity {
                continue;
            }
            sources += 1;
            let reach = self.config.base_radius * source.intensity;

            for target in actors {
                if target.id == source.id || !target.layer.intersects(self.config.layer_mask) {
                    continue;
                }
                let distance = source.location.distance(&target.location);
                if distance > reach {
                    continue;
                }
                let mut effective = effective_intensity(source.intensity, distance, &self.config);
                if effective <= 0.0 {
                    continue;
                }
                if relationships.is_enabled() {
                    effective *= relationships.influence_modifier(source.id, target.id);
                    relationships.update_relationship(target.id, source.id, source.emotion, effective);
                }

                let stimulus = EmotionalStimulus::new(StimulusKind::from_emotion(source.emotion), effective)
                    .from_actor(source.id)
                    .to_actor(target.id)
                    .at(source.location);
                planned.push(Influence {
                    source: source.id,
                    target: target.id,
                    effective_intensity: effective,
                    stimulus,
                });
            }
        }

        debug!(actors = actors.len(), sources, planned = planned.len(), "influence pass planned");
        planned
    }
}
