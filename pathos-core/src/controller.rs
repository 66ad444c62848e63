//! Emotion Core — the per-actor controller.
//!
//! The core owns one actor's rule-derived *base* state, its modifier ledger
//! and its emotional memory. The *visible* state is always the base with
//! every live modifier stacked on top (see [`ModifierLedger::resolve`]).
//!
//! Every mutation funnels through one reconciliation step: recompute the
//! visible state, compare it with the last notified state, and on a change
//! record it to memory, notify observers and evaluate threshold / combo
//! behaviors.
//!
//! A core built without a profile is inert: it accepts no stimuli, performs
//! no decay and stays at neutral. The missing profile is logged once, here.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::{PathosConfig, SimulationConfig};
use crate::emotion::{Emotion, EmotionTraits, EmotionalState};
use crate::events::{
    ChangeSource, ComboSignal, CoreEvent, EmotionChangeEvent, Observers, ThresholdSignal,
};
use crate::memory::EmotionMemory;
use crate::metrics::EmotionCounters;
use crate::modifier::{ActiveModifier, ModifierLedger};
use crate::profile::EmotionProfile;
use crate::stimulus::EmotionalStimulus;
use crate::types::{ActorId, GameTimestamp};

/// What happened to a stimulus offered to [`EmotionCore::process_stimulus`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StimulusOutcome {
    /// The core is disabled or the stimulus is addressed to another actor.
    Ignored,
    /// No reaction rule matched.
    Unmatched,
    /// A rule applied but the visible state did not change.
    Unchanged,
    /// A rule applied and the visible state changed.
    Applied,
    /// The matching rule has a reaction delay. The caller owns the timer and
    /// hands the rule back through [`EmotionCore::apply_deferred`].
    Deferred {
        /// Index of the rule in the profile's table.
        rule_index: usize,
        /// Seconds until the reaction is due.
        delay: f32,
    },
}

/// Serializable view of one core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreSnapshot {
    /// Owning actor.
    pub actor: ActorId,
    /// Profile name, `None` when disabled.
    pub profile: Option<String>,
    /// Rule-derived state.
    pub base: EmotionalState,
    /// Visible state.
    pub state: EmotionalState,
    /// Live modifiers in insertion order.
    pub modifiers: Vec<ActiveModifier>,
    /// Emotional memory.
    pub memory: EmotionMemory,
}

/// Per-actor emotion controller.
#[derive(Debug)]
pub struct EmotionCore {
    actor: ActorId,
    profile: Option<Arc<EmotionProfile>>,
    base: EmotionalState,
    notified: EmotionalState,
    ledger: ModifierLedger,
    memory: EmotionMemory,
    consumed_thresholds: Vec<bool>,
    consumed_combos: Vec<bool>,
    simulation: SimulationConfig,
    counters: Arc<EmotionCounters>,
    change_observers: Observers<EmotionChangeEvent>,
    threshold_observers: Observers<ThresholdSignal>,
    combo_observers: Observers<ComboSignal>,
    outbox: Option<Vec<CoreEvent>>,
}

impl EmotionCore {
    /// Create the core for `actor`, starting at the profile's filtered baseline.
    ///
    /// With `profile == None` the core is permanently disabled.
    #[must_use]
    pub fn new(actor: ActorId, profile: Option<Arc<EmotionProfile>>, config: &PathosConfig) -> Self {
        let profile = profile.map(normalize_shared);
        let decay_rate = profile.as_ref().map_or(0.1, |p| p.decay_rate);
        let base = match &profile {
            Some(p) => {
                let dominant = p.traits.dominant;
                EmotionalState::new(dominant, p.traits.filter_intensity(dominant, p.baseline_intensity))
            }
            None => {
                warn!(actor = %actor, "no emotion profile, emotion core disabled");
                EmotionalState::default()
            }
        };
        let (thresholds, combos) = profile
            .as_ref()
            .map_or((0, 0), |p| (p.thresholds.len(), p.combos.len()));

        Self {
            actor,
            profile,
            base,
            notified: base,
            ledger: ModifierLedger::new(),
            memory: EmotionMemory::new(config.memory.clone(), decay_rate),
            consumed_thresholds: vec![false; thresholds],
            consumed_combos: vec![false; combos],
            simulation: config.simulation.clone(),
            counters: Arc::new(EmotionCounters::new()),
            change_observers: Observers::new(),
            threshold_observers: Observers::new(),
            combo_observers: Observers::new(),
            outbox: None,
        }
    }

    /// Share a counter set with other cores.
    #[must_use]
    pub fn with_counters(mut self, counters: Arc<EmotionCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Also queue every event for [`drain_events`](Self::drain_events).
    #[must_use]
    pub fn collecting_events(mut self) -> Self {
        self.outbox = Some(Vec::new());
        self
    }

    // ---- Accessors ----

    /// Owning actor.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Whether the core has a profile.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.profile.is_some()
    }

    /// The shared profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&Arc<EmotionProfile>> {
        self.profile.as_ref()
    }

    /// Personality traits (defaults when disabled).
    #[must_use]
    pub fn traits(&self) -> EmotionTraits {
        self.profile.as_ref().map(|p| p.traits).unwrap_or_default()
    }

    /// Visible state: base plus every live modifier.
    #[must_use]
    pub fn current_state(&self) -> EmotionalState {
        self.ledger.resolve(&self.base)
    }

    /// Rule-derived state without modifiers.
    #[must_use]
    pub fn base_state(&self) -> EmotionalState {
        self.base
    }

    /// Whether the visible emotion is the dominant trait.
    #[must_use]
    pub fn is_dominant(&self) -> bool {
        self.current_state().is_dominant(&self.traits())
    }

    /// Active modifiers.
    #[must_use]
    pub fn modifiers(&self) -> &ModifierLedger {
        &self.ledger
    }

    /// Emotional memory.
    #[must_use]
    pub fn memory(&self) -> &EmotionMemory {
        &self.memory
    }

    /// Mutable emotional memory (e.g. to clear it).
    pub fn memory_mut(&mut self) -> &mut EmotionMemory {
        &mut self.memory
    }

    /// Aggregate sentiment toward `other` in [-1, 1].
    #[must_use]
    pub fn impression_of(&self, other: ActorId) -> f32 {
        self.memory.impression_of(other)
    }

    /// Per-actor change observers.
    pub fn change_observers(&mut self) -> &mut Observers<EmotionChangeEvent> {
        &mut self.change_observers
    }

    /// Per-actor threshold observers.
    pub fn threshold_observers(&mut self) -> &mut Observers<ThresholdSignal> {
        &mut self.threshold_observers
    }

    /// Per-actor combo observers.
    pub fn combo_observers(&mut self) -> &mut Observers<ComboSignal> {
        &mut self.combo_observers
    }

    /// Take every queued event. Empty unless built with
    /// [`collecting_events`](Self::collecting_events).
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        self.outbox.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Serializable view of the core.
    #[must_use]
    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            actor: self.actor,
            profile: self.profile.as_ref().map(|p| p.name.clone()),
            base: self.base,
            state: self.current_state(),
            modifiers: self.ledger.live().copied().collect(),
            memory: self.memory.clone(),
        }
    }

    // ---- Stimulus intake ----

    /// Offer a stimulus. Absent rules and foreign targets are silent no-ops.
    pub fn process_stimulus(
        &mut self,
        stimulus: &EmotionalStimulus,
        now: &GameTimestamp,
    ) -> StimulusOutcome {
        let Some(profile) = self.profile.clone() else {
            return StimulusOutcome::Ignored;
        };
        if !stimulus.is_for(self.actor) {
            trace!(actor = %self.actor, kind = %stimulus.kind, "stimulus addressed elsewhere");
            return StimulusOutcome::Ignored;
        }
        EmotionCounters::add(&self.counters.stimuli_received, 1);

        let current = self.current_state().emotion;
        let Some((index, rule)) = profile.find_rule(&stimulus.kind, current) else {
            EmotionCounters::add(&self.counters.stimuli_unmatched, 1);
            trace!(actor = %self.actor, kind = %stimulus.kind, emotion = %current, "no reaction rule");
            return StimulusOutcome::Unmatched;
        };

        if rule.reaction_delay > 0.0 {
            EmotionCounters::add(&self.counters.reactions_deferred, 1);
            debug!(actor = %self.actor, rule = index, delay = rule.reaction_delay, "reaction deferred");
            return StimulusOutcome::Deferred {
                rule_index: index,
                delay: rule.reaction_delay,
            };
        }
        self.apply_rule(&profile, index, stimulus, ChangeSource::Stimulus, now)
    }

    /// Apply a reaction previously returned as [`StimulusOutcome::Deferred`].
    pub fn apply_deferred(
        &mut self,
        rule_index: usize,
        stimulus: &EmotionalStimulus,
        now: &GameTimestamp,
    ) -> StimulusOutcome {
        let Some(profile) = self.profile.clone() else {
            return StimulusOutcome::Ignored;
        };
        self.apply_rule(&profile, rule_index, stimulus, ChangeSource::DeferredStimulus, now)
    }

    fn apply_rule(
        &mut self,
        profile: &EmotionProfile,
        index: usize,
        stimulus: &EmotionalStimulus,
        source: ChangeSource,
        now: &GameTimestamp,
    ) -> StimulusOutcome {
        let Some(rule) = profile.rule(index) else {
            return StimulusOutcome::Unmatched;
        };

        let (emotion, start) = if rule.override_current {
            (rule.resulting, 0.0)
        } else {
            (self.base.emotion, self.base.intensity)
        };
        let delta = rule.intensity_delta * stimulus.effective_potency() * profile.sensitivity;
        let filtered = delta * profile.traits.intensity_factor(emotion);
        self.base.emotion = emotion;
        self.base.intensity = (start + filtered).clamp(0.0, rule.max_intensity.max(0.0));

        if !self.reconcile(source, Some(stimulus), now) {
            return StimulusOutcome::Unchanged;
        }

        if rule.sustained_duration > 0.0 {
            self.ledger.push(ActiveModifier::sustain(rule.sustained_duration));
        }
        let mut secondary = false;
        for effect in stimulus.secondary.iter().filter(|e| !e.emotion.is_neutral()) {
            let delta = stimulus.secondary_potency(effect) * profile.sensitivity;
            self.ledger
                .push(ActiveModifier::blended(effect.emotion, delta, effect.duration_modifier));
            secondary = true;
        }
        if secondary {
            self.reconcile(ChangeSource::Modifier, Some(stimulus), now);
        }
        StimulusOutcome::Applied
    }

    // ---- Direct overrides ----

    /// Show `emotion` at exactly `intensity` for `duration` seconds, bypassing
    /// rules and trait filtering.
    pub fn force_emotion(
        &mut self,
        emotion: Emotion,
        intensity: f32,
        duration: f32,
        now: &GameTimestamp,
    ) {
        if !self.is_enabled() {
            return;
        }
        let delta = intensity.clamp(0.0, 1.0) - self.current_state().intensity;
        self.ledger.push(ActiveModifier::new(emotion, delta, duration));
        self.reconcile(ChangeSource::Forced, None, now);
    }

    /// Add a time-bounded modifier and reconcile.
    pub fn apply_modifier(&mut self, modifier: ActiveModifier, now: &GameTimestamp) {
        if !self.is_enabled() {
            return;
        }
        self.ledger.push(modifier);
        self.reconcile(ChangeSource::Modifier, None, now);
    }

    /// Replace the base state with trait filtering applied. Returns whether
    /// the visible state changed.
    pub fn set_emotion(&mut self, emotion: Emotion, intensity: f32, now: &GameTimestamp) -> bool {
        let Some(traits) = self.profile.as_ref().map(|p| p.traits) else {
            return false;
        };
        self.set_base(&traits, emotion, intensity);
        self.reconcile(ChangeSource::Forced, None, now)
    }

    fn set_base(&mut self, traits: &EmotionTraits, emotion: Emotion, intensity: f32) {
        self.base.emotion = emotion;
        self.base.intensity = traits.filter_intensity(emotion, intensity);
    }

    /// Externally slow (or stop slowing) decay.
    pub fn suspend_decay(&mut self, suspended: bool) {
        self.base.decay_suspended = suspended;
    }

    // ---- Decay ----

    /// Advance by one decay tick of `dt` seconds.
    ///
    /// A non-dominant emotion fades by `dt × (1.1 − stability)` and resets to
    /// the baseline once it reaches the reset threshold. The dominant emotion
    /// settles onto its baseline, faster with higher resilience. Modifiers age
    /// and memories fade on the same tick.
    pub fn tick(&mut self, dt: f32, now: &GameTimestamp) {
        let Some(profile) = self.profile.clone() else {
            return;
        };
        let traits = &profile.traits;

        let mut amount = dt * (1.1 - traits.stability);
        if self.base.decay_suspended || self.ledger.blocks_decay() {
            amount *= self.simulation.suspended_decay_factor;
        }

        let mut source = ChangeSource::Decay;
        if self.base.is_dominant(traits) {
            let target = traits.filter_intensity(traits.dominant, profile.baseline_intensity);
            let step = amount * (1.0 + profile.resilience);
            let gap = target - self.base.intensity;
            self.base.intensity = if gap.abs() <= step {
                target
            } else {
                (self.base.intensity + step.copysign(gap)).clamp(0.0, 1.0)
            };
        } else {
            self.base.intensity = (self.base.intensity - amount).clamp(0.0, 1.0);
            if self.base.intensity <= self.simulation.reset_threshold {
                self.set_base(traits, traits.dominant, profile.baseline_intensity);
                source = ChangeSource::BaselineReset;
                debug!(actor = %self.actor, emotion = %traits.dominant, "emotion reset to baseline");
            }
        }

        let aged = self.ledger.age(dt);
        if aged.expired_live > 0 && source == ChangeSource::Decay {
            source = ChangeSource::Modifier;
        }

        let forgotten = self.memory.decay(dt);
        EmotionCounters::add(&self.counters.memories_forgotten, forgotten as u64);

        self.reconcile(source, None, now);
    }

    // ---- Reconciliation ----

    fn reconcile(
        &mut self,
        source: ChangeSource,
        stimulus: Option<&EmotionalStimulus>,
        now: &GameTimestamp,
    ) -> bool {
        let next = self.ledger.resolve(&self.base);
        if !next.differs_from(&self.notified, self.simulation.change_epsilon) {
            return false;
        }

        let event = EmotionChangeEvent {
            actor: self.actor,
            old_emotion: self.notified.emotion,
            old_intensity: self.notified.intensity,
            new_emotion: next.emotion,
            new_intensity: next.intensity,
            source,
            stimulus: stimulus.cloned(),
            timestamp: *now,
        };
        self.notified = next;
        EmotionCounters::add(&self.counters.changes_committed, 1);

        let remembered = !matches!(source, ChangeSource::Decay | ChangeSource::BaselineReset);
        if remembered && self.memory.record_event(&event) {
            EmotionCounters::add(&self.counters.memories_recorded, 1);
        }

        self.change_observers.emit(&event);
        if let Some(outbox) = &mut self.outbox {
            outbox.push(CoreEvent::Changed(event));
        }
        self.evaluate_behaviors(next, now);
        true
    }

    fn evaluate_behaviors(&mut self, state: EmotionalState, now: &GameTimestamp) {
        let Some(profile) = self.profile.clone() else {
            return;
        };

        for (index, behavior) in profile.thresholds.iter().enumerate() {
            if self.consumed_thresholds[index] || !behavior.matches(state.emotion, state.intensity) {
                continue;
            }
            self.consumed_thresholds[index] = behavior.one_shot;
            debug!(actor = %self.actor, behavior = %behavior.name, "threshold behavior fired");
            let signal = ThresholdSignal {
                actor: self.actor,
                behavior: behavior.name.clone(),
                emotion: state.emotion,
                intensity: state.intensity,
                timestamp: *now,
            };
            EmotionCounters::add(&self.counters.behavior_signals, 1);
            self.threshold_observers.emit(&signal);
            if let Some(outbox) = &mut self.outbox {
                outbox.push(CoreEvent::Threshold(signal));
            }
        }

        for (index, behavior) in profile.combos.iter().enumerate() {
            if self.consumed_combos[index] || !behavior.matches(state.emotion, state.intensity) {
                continue;
            }
            self.consumed_combos[index] = behavior.one_shot;
            debug!(actor = %self.actor, behavior = %behavior.name, "combo behavior fired");
            let signal = ComboSignal {
                actor: self.actor,
                behavior: behavior.name.clone(),
                resulting: behavior.resulting,
                intensity: state.intensity,
                timestamp: *now,
            };
            EmotionCounters::add(&self.counters.behavior_signals, 1);
            self.combo_observers.emit(&signal);
            if let Some(outbox) = &mut self.outbox {
                outbox.push(CoreEvent::Combo(signal));
            }
        }
    }
}

/// Clamp a profile's ranged values, reusing the shared copy when it is
/// already in range.
fn normalize_shared(profile: Arc<EmotionProfile>) -> Arc<EmotionProfile> {
    let normalized = EmotionProfile::clone(&profile).normalized();
    if normalized == *profile {
        profile
    } else {
        Arc::new(normalized)
    }
}
