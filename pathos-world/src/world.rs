//! Emotion World — binds game events, timers and the influence pass to the
//! per-actor emotion cores.
//!
//! One [`EmotionWorld`] owns every actor of a scene plus the data shared
//! between them: the profile library, the relationship store, the deferred
//! reaction timer and the scene-wide observer lists. It is driven by
//! [`EmotionWorld::step`] from the host's fixed-rate update and never
//! spawns threads.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, debug_span, trace, warn};

use pathos_core::error::{PathosError, Result};
use pathos_core::events::{CoreEvent, EmotionChangeEvent, Observers, SubscriptionId};
use pathos_core::influence::Influence;
use pathos_core::metrics::{spans, CounterSnapshot, EmotionCounters, StepBudgetMonitor};
use pathos_core::modifier::ActiveModifier;
use pathos_core::relationship::{RelationshipStore, SocialRelationship};
use pathos_core::scheduler::{IntervalClock, Scheduler};
use pathos_core::{
    ActorId, Emotion, EmotionCore, EmotionProfile, EmotionalState, EmotionalStimulus,
    GameTimestamp, InfluenceSystem, LayerMask, Location, PathosConfig, ProfileLibrary,
    StimulusKind, StimulusOutcome,
};

use crate::components::{Actor, ActorTable};
use crate::events::GameEvent;
use crate::systems;

/// Key of a deferred reaction: the reacting actor and the rule index.
type DeferredKey = (ActorId, usize);

/// What one [`EmotionWorld::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Queued stimuli applied.
    pub queued: usize,
    /// Deferred reactions that came due.
    pub deferred: usize,
    /// Decay ticks run.
    pub decay_ticks: u32,
    /// Influence passes run.
    pub influence_passes: u32,
    /// Influence stimuli delivered to live actors.
    pub influence_deliveries: usize,
}

// ---------------------------------------------------------------------------
// World State
// ---------------------------------------------------------------------------

/// Central state for one emotion-simulated scene.
pub struct EmotionWorld {
    config: PathosConfig,
    profiles: ProfileLibrary,
    actors: ActorTable,
    relationships: RelationshipStore,
    deferred: Scheduler<DeferredKey, EmotionalStimulus>,
    influence: InfluenceSystem,
    scene: Observers<EmotionChangeEvent>,
    scene_signals: Observers<CoreEvent>,
    queue: VecDeque<(ActorId, EmotionalStimulus)>,
    clock: GameTimestamp,
    decay_clock: IntervalClock,
    counters: Arc<EmotionCounters>,
    monitor: Arc<StepBudgetMonitor>,
}

impl EmotionWorld {
    /// Create an empty world with no profiles.
    #[must_use]
    pub fn new(config: PathosConfig) -> Self {
        Self::with_profiles(config, ProfileLibrary::new())
    }

    /// Create an empty world using `profiles` for [`spawn`](Self::spawn).
    #[must_use]
    pub fn with_profiles(config: PathosConfig, profiles: ProfileLibrary) -> Self {
        Self {
            relationships: RelationshipStore::new(config.social.clone()),
            influence: InfluenceSystem::new(config.influence.clone()),
            monitor: Arc::new(StepBudgetMonitor::new(config.performance.step_budget_ms)),
            profiles,
            actors: ActorTable::new(),
            deferred: Scheduler::new(),
            scene: Observers::new(),
            scene_signals: Observers::new(),
            queue: VecDeque::new(),
            clock: GameTimestamp::zero(),
            decay_clock: IntervalClock::new(),
            counters: Arc::new(EmotionCounters::new()),
            config,
        }
    }

    /// Load `pathos.toml` and a profile library from disk.
    ///
    /// # Errors
    /// Returns an error if either file cannot be read or parsed.
    pub fn from_files(config: &std::path::Path, profiles: &std::path::Path) -> Result<Self> {
        let config = PathosConfig::from_file(config)?;
        let profiles = ProfileLibrary::from_file(profiles)?;
        debug!(profiles = profiles.len(), "emotion world loaded from files");
        Ok(Self::with_profiles(config, profiles))
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PathosConfig {
        &self.config
    }

    /// Profile library used by [`spawn`](Self::spawn).
    pub fn profiles_mut(&mut self) -> &mut ProfileLibrary {
        &mut self.profiles
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> GameTimestamp {
        self.clock
    }

    // ---- Actor lifecycle ----

    /// Spawn an actor using the named profile.
    ///
    /// An unknown profile name still spawns the actor, with a disabled core.
    pub fn spawn(&mut self, profile: &str, location: Location) -> ActorId {
        let profile = self.profiles.get(profile).ok();
        self.spawn_with(profile, location)
    }

    /// Spawn an actor with an explicit profile.
    pub fn spawn_with_profile(&mut self, profile: Arc<EmotionProfile>, location: Location) -> ActorId {
        self.spawn_with(Some(profile), location)
    }

    fn spawn_with(&mut self, profile: Option<Arc<EmotionProfile>>, location: Location) -> ActorId {
        let id = ActorId::new();
        let core = EmotionCore::new(id, profile, &self.config)
            .with_counters(Arc::clone(&self.counters))
            .collecting_events();
        self.actors.insert(Actor::new(core, location));
        trace!(actor = %id, %location, "actor spawned");
        id
    }

    /// Remove an actor. Its pending deferred reactions and queued stimuli are
    /// dropped; relationships other actors hold toward it are kept.
    pub fn despawn(&mut self, id: ActorId) -> bool {
        if self.actors.remove(id).is_none() {
            return false;
        }
        let cancelled = self.deferred.cancel_where(|(actor, _)| *actor == id);
        self.queue.retain(|(actor, _)| *actor != id);
        debug!(actor = %id, cancelled, "actor despawned");
        true
    }

    /// Whether the actor exists.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains(id)
    }

    /// Number of actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Actor ids in spawn order.
    #[must_use]
    pub fn actor_ids(&self) -> &[ActorId] {
        self.actors.ids()
    }

    /// Direct access to an actor's core (per-actor subscriptions, memory).
    pub fn core_mut(&mut self, id: ActorId) -> Option<&mut EmotionCore> {
        self.actors.get_mut(id).map(|actor| &mut actor.core)
    }

    /// Read-only access to an actor's core.
    #[must_use]
    pub fn core(&self, id: ActorId) -> Option<&EmotionCore> {
        self.actors.get(id).map(|actor| &actor.core)
    }

    /// Move an actor.
    pub fn set_location(&mut self, id: ActorId, location: Location) -> bool {
        self.with_actor(id, |actor| actor.location = location)
    }

    /// Include or exclude an actor from influence and area events.
    pub fn set_enabled(&mut self, id: ActorId, enabled: bool) -> bool {
        self.with_actor(id, |actor| actor.enabled = enabled)
    }

    /// Move an actor to other layers.
    pub fn set_layer(&mut self, id: ActorId, layer: LayerMask) -> bool {
        self.with_actor(id, |actor| actor.layer = layer)
    }

    fn with_actor(&mut self, id: ActorId, f: impl FnOnce(&mut Actor)) -> bool {
        match self.actors.get_mut(id) {
            Some(actor) => {
                f(actor);
                true
            }
            None => false,
        }
    }

    // ---- Stimulus intake ----

    /// Offer a stimulus to an actor now. A delayed reaction is scheduled on
    /// the world timer. Missing actors are a no-op.
    pub fn send_stimulus(&mut self, id: ActorId, stimulus: EmotionalStimulus) -> StimulusOutcome {
        let now = self.clock;
        let Some(actor) = self.actors.get_mut(id) else {
            trace!(actor = %id, kind = %stimulus.kind, "stimulus for missing actor dropped");
            return StimulusOutcome::Ignored;
        };
        let outcome = actor.core.process_stimulus(&stimulus, &now);
        if let StimulusOutcome::Deferred { rule_index, delay } = outcome {
            let due = now.seconds + f64::from(delay);
            self.deferred.schedule((id, rule_index), due, stimulus);
        }
        self.dispatch(id);
        outcome
    }

    /// Queue a stimulus for the next [`step`](Self::step). Queued stimuli are
    /// applied in arrival order.
    pub fn enqueue_stimulus(&mut self, id: ActorId, stimulus: EmotionalStimulus) {
        self.queue.push_back((id, stimulus));
    }

    /// Number of stimuli waiting for the next step.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Number of deferred reactions waiting on the timer.
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Deliver a game event to every actor it affects. Returns how many
    /// stimuli were delivered.
    pub fn handle_event(&mut self, event: &GameEvent) -> usize {
        let deliveries = systems::event_deliveries(event, &self.actors);
        let delivered = deliveries.len();
        for (target, stimulus) in deliveries {
            self.send_stimulus(target, stimulus);
        }
        delivered
    }

    // ---- Direct overrides ----

    /// Show `emotion` at `intensity` on an actor for `duration` seconds.
    pub fn force_emotion(&mut self, id: ActorId, emotion: Emotion, intensity: f32, duration: f32) -> bool {
        let now = self.clock;
        let found = self.with_actor(id, |actor| actor.core.force_emotion(emotion, intensity, duration, &now));
        self.dispatch(id);
        found
    }

    /// Attach a modifier to an actor.
    pub fn apply_modifier(&mut self, id: ActorId, modifier: ActiveModifier) -> bool {
        let now = self.clock;
        let found = self.with_actor(id, |actor| actor.core.apply_modifier(modifier, &now));
        self.dispatch(id);
        found
    }

    /// Slow an actor's decay until resumed.
    pub fn suspend_decay(&mut self, id: ActorId, suspended: bool) -> bool {
        self.with_actor(id, |actor| actor.core.suspend_decay(suspended))
    }

    // ---- Queries ----

    /// Visible state of an actor, `None` if it does not exist.
    #[must_use]
    pub fn current_state(&self, id: ActorId) -> Option<EmotionalState> {
        self.actors.get(id).map(|actor| actor.core.current_state())
    }

    /// Visible state of an actor.
    ///
    /// # Errors
    /// Returns `PathosError::ActorNotFound` if the actor does not exist.
    pub fn try_state(&self, id: ActorId) -> Result<EmotionalState> {
        self.current_state(id).ok_or(PathosError::ActorNotFound(id))
    }

    /// How `observer` regards `other`, creating a neutral entry if needed.
    pub fn get_relationship(&mut self, observer: ActorId, other: ActorId) -> SocialRelationship {
        self.relationships.get_relationship(observer, other)
    }

    /// The relationship store.
    #[must_use]
    pub fn relationships(&self) -> &RelationshipStore {
        &self.relationships
    }

    /// The relationship store, for scripted overrides.
    pub fn relationships_mut(&mut self) -> &mut RelationshipStore {
        &mut self.relationships
    }

    /// Impression `observer` holds of `other`, 0 if either is unknown.
    #[must_use]
    pub fn get_impression_of(&self, observer: ActorId, other: ActorId) -> f32 {
        self.actors
            .get(observer)
            .map_or(0.0, |actor| actor.core.impression_of(other))
    }

    /// Serialize one actor's core to JSON.
    ///
    /// # Errors
    /// Returns `ActorNotFound` for unknown actors and `Serialization` if
    /// encoding fails.
    pub fn snapshot_json(&self, id: ActorId) -> Result<String> {
        let actor = self.actors.get(id).ok_or(PathosError::ActorNotFound(id))?;
        serde_json::to_string_pretty(&actor.core.snapshot())
            .map_err(|e| PathosError::Serialization(e.to_string()))
    }

    // ---- Subscriptions ----

    /// Subscribe to every actor's state changes.
    pub fn subscribe_scene(&mut self, handler: impl FnMut(&EmotionChangeEvent) + 'static) -> SubscriptionId {
        self.scene.subscribe(handler)
    }

    /// Remove a scene-wide change subscription.
    pub fn unsubscribe_scene(&mut self, id: SubscriptionId) -> bool {
        self.scene.unsubscribe(id)
    }

    /// Subscribe to every actor's threshold and combo signals.
    pub fn subscribe_signals(&mut self, handler: impl FnMut(&CoreEvent) + 'static) -> SubscriptionId {
        self.scene_signals.subscribe(handler)
    }

    /// Remove a scene-wide signal subscription.
    pub fn unsubscribe_signals(&mut self, id: SubscriptionId) -> bool {
        self.scene_signals.unsubscribe(id)
    }

    /// Subscribe to one actor's state changes. `None` for unknown actors.
    pub fn subscribe_actor(
        &mut self,
        id: ActorId,
        handler: impl FnMut(&EmotionChangeEvent) + 'static,
    ) -> Option<SubscriptionId> {
        self.core_mut(id)
            .map(|core| core.change_observers().subscribe(handler))
    }

    // ---- Influence ----

    /// Plan one influence pass over a snapshot of the live actors.
    /// Relationships are updated while planning.
    pub fn plan_influence(&mut self) -> Vec<Influence> {
        let snapshot = systems::snapshot_actors(&self.actors);
        self.influence.plan(&snapshot, &mut self.relationships)
    }

    /// Deliver planned influences. Targets destroyed since planning are
    /// skipped. Returns how many were delivered.
    pub fn deliver_influence(&mut self, planned: Vec<Influence>) -> usize {
        let mut delivered = 0;
        for influence in planned {
            if !self.actors.contains(influence.target) {
                trace!(actor = %influence.target, "influence target gone");
                continue;
            }
            self.send_stimulus(influence.target, influence.stimulus);
            delivered += 1;
        }
        EmotionCounters::add(&self.counters.influence_deliveries, delivered as u64);
        delivered
    }

    // ---- Step ----

    /// Advance the simulation by `dt` seconds.
    ///
    /// Order within a step: queued stimuli (arrival order), deferred
    /// reactions that came due, decay ticks, influence passes.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let monitor = Arc::clone(&self.monitor);
        let guard = monitor.begin_step();
        let span = debug_span!(spans::STEP, tick = self.clock.tick + 1);
        let _enter = span.enter();

        let dt = if dt.is_finite() {
            dt.max(0.0)
        } else {
            warn!(dt, "non-finite step length ignored");
            0.0
        };
        self.clock = GameTimestamp::at(self.clock.tick + 1, self.clock.seconds + f64::from(dt));
        let mut report = StepReport::default();

        while let Some((id, stimulus)) = self.queue.pop_front() {
            self.send_stimulus(id, stimulus);
            report.queued += 1;
        }

        let now = self.clock;
        for ((id, rule_index), stimulus) in self.deferred.drain_due(now.seconds) {
            let _deferred = debug_span!(spans::DEFERRED, actor = %id, rule = rule_index).entered();
            if let Some(actor) = self.actors.get_mut(id) {
                actor.core.apply_deferred(rule_index, &stimulus, &now);
                report.deferred += 1;
            }
            self.dispatch(id);
        }

        let tick = self.config.simulation.tick_interval;
        report.decay_ticks = self.decay_clock.advance(dt, tick);
        for _ in 0..report.decay_ticks {
            let _decay = debug_span!(spans::DECAY, actors = self.actors.len()).entered();
            systems::run_decay(&mut self.actors, tick, &now);
        }
        if report.decay_ticks > 0 {
            self.dispatch_all();
        }

        let passes = self.influence.advance(dt);
        for _ in 0..passes {
            let _influence = debug_span!(spans::INFLUENCE).entered();
            let planned = self.plan_influence();
            report.influence_deliveries += self.deliver_influence(planned);
            EmotionCounters::add(&self.counters.influence_passes, 1);
        }
        report.influence_passes = passes;

        trace!(elapsed_ms = guard.elapsed_ms(), ?report, "step complete");
        report
    }

    // ---- Observability ----

    /// Read the shared counters.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Step timing.
    #[must_use]
    pub fn monitor(&self) -> &StepBudgetMonitor {
        &self.monitor
    }

    // ---- Scene notification ----

    fn dispatch(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        for event in actor.core.drain_events() {
            match &event {
                CoreEvent::Changed(change) => {
                    self.scene.emit(change);
                    self.record_interaction(change);
                }
                CoreEvent::Threshold(_) | CoreEvent::Combo(_) => self.scene_signals.emit(&event),
            }
        }
    }

    /// Fold a committed change caused by another actor into the changed
    /// actor's view of that actor. Contagion is folded in while planning.
    fn record_interaction(&mut self, change: &EmotionChangeEvent) {
        let Some(stimulus) = &change.stimulus else {
            return;
        };
        let Some(source) = stimulus.source else {
            return;
        };
        if source == change.actor
            || matches!(stimulus.kind, StimulusKind::Contagion(_))
            || !self.relationships.is_enabled()
        {
            return;
        }
        self.relationships
            .update_relationship(change.actor, source, change.new_emotion, change.new_intensity);
        trace!(actor = %change.actor, source = %source, "relationship updated");
    }

    fn dispatch_all(&mut self) {
        let ids = self.actors.ids().to_vec();
        for id in ids {
            self.dispatch(id);
        }
    }
}

impl Default for EmotionWorld {
    fn default() -> Self {
        Self::new(PathosConfig::default())
    }
}

impl std::fmt::Debug for EmotionWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionWorld")
            .field("actors", &self.actors.len())
            .field("relationships", &self.relationships.len())
            .field("queued", &self.queue.len())
            .field("deferred", &self.deferred.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
