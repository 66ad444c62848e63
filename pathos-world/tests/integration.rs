//! Integration Tests — End-to-End Scene Flows
//!
//! These tests drive a whole [`EmotionWorld`]: game events → stimuli →
//! state changes → scene notifications, deferred reactions, the influence
//! pass and file-based configuration.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;

use pathos_core::events::CoreEvent;
use pathos_core::profile::ThresholdBehavior;
use pathos_core::{
    ActorId, Emotion, EmotionProfile, EmotionTraits, EmotionalStimulus, Location, PathosConfig,
    PathosError, ReactionRule, StimulusKind, StimulusOutcome,
};
use pathos_world::{hooks, EmotionWorld};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn at(x: f32) -> Location {
    Location::new(x, 0.0, 0.0)
}

fn joyful() -> Arc<EmotionProfile> {
    Arc::new(
        EmotionProfile::new("joyful")
            .with_traits(EmotionTraits {
                dominant: Emotion::HAPPY,
                ..EmotionTraits::default()
            })
            .with_baseline(0.9),
    )
}

fn villager() -> Arc<EmotionProfile> {
    Arc::new(
        EmotionProfile::new("villager")
            .with_baseline(0.0)
            .with_rule(ReactionRule::new(StimulusKind::Gift, Emotion::HAPPY, 0.5))
            .with_rule(ReactionRule::new(StimulusKind::Insult, Emotion::ANGRY, 0.8))
            .with_rule(ReactionRule::new(StimulusKind::Attack, Emotion::FEARFUL, 0.9))
            .with_rule(ReactionRule::new(StimulusKind::Threat, Emotion::ANXIOUS, 0.5))
            .with_rule(ReactionRule::new(StimulusKind::Threat, Emotion::FURIOUS, 0.9).when(Emotion::ANGRY))
            .with_rule(ReactionRule::new(StimulusKind::from_emotion(Emotion::HAPPY), Emotion::HAPPY, 1.0))
            .with_rule(ReactionRule::new(StimulusKind::Loss, Emotion::SAD, 0.7).delayed(1.0))
            .with_threshold(ThresholdBehavior {
                name: "lash_out".into(),
                emotion: Emotion::ANGRY,
                min_intensity: 0.7,
                one_shot: true,
            }),
    )
}

// ---------------------------------------------------------------------------
// Influence: relationship modulation (friendly source amplifies)
// ---------------------------------------------------------------------------

fn planned_intensity(score: Option<f32>) -> (f32, EmotionWorld, ActorId, ActorId) {
    let mut world = EmotionWorld::default();
    let source = world.spawn_with_profile(joyful(), at(0.0));
    let target = world.spawn_with_profile(villager(), at(2.0));
    if let Some(score) = score {
        world.relationships_mut().set_score(target, source, score);
    }

    let planned = world.plan_influence();
    assert_eq!(planned.len(), 1, "only the joyful actor radiates");
    assert_eq!(planned[0].source, source);
    assert_eq!(planned[0].target, target);
    (planned[0].effective_intensity, world, source, target)
}

#[test]
fn friendly_relationship_scales_influence() {
    init_tracing();
    let (neutral, _, _, _) = planned_intensity(None);
    let (friendly, mut world, source, target) = planned_intensity(Some(0.5));

    assert!(neutral > 0.0);
    assert!((friendly - neutral * 1.5).abs() < 1e-5);

    let relationship = world.get_relationship(target, source);
    assert!(relationship.familiarity > 0.1);
    assert!(relationship.score > 0.5);
}

#[test]
fn destroyed_target_is_skipped_on_delivery() {
    init_tracing();
    let mut world = EmotionWorld::default();
    world.spawn_with_profile(joyful(), at(0.0));
    let doomed = world.spawn_with_profile(villager(), at(1.0));
    let survivor = world.spawn_with_profile(villager(), at(-1.0));

    let planned = world.plan_influence();
    assert_eq!(planned.len(), 2);
    assert!(world.despawn(doomed));

    assert_eq!(world.deliver_influence(planned), 1);
    assert_eq!(world.current_state(survivor).map(|s| s.emotion), Some(Emotion::HAPPY));
    assert!(world.current_state(doomed).is_none());
    assert_eq!(world.counters().influence_deliveries, 1);
}

#[test]
fn influence_runs_on_its_own_interval() {
    init_tracing();
    let mut world = EmotionWorld::default();
    world.spawn_with_profile(joyful(), at(0.0));
    let listener = world.spawn_with_profile(villager(), at(2.0));

    assert_eq!(world.step(0.5).influence_passes, 0);
    assert_eq!(world.step(0.5).influence_passes, 0);
    let report = world.step(0.5);
    assert_eq!(report.influence_passes, 1);
    assert_eq!(report.influence_deliveries, 1);

    let state = world.try_state(listener).expect("listener exists");
    assert_eq!(state.emotion, Emotion::HAPPY);
    assert!(state.intensity > 0.3);
    assert_eq!(world.counters().influence_passes, 1);
}

#[test]
fn layer_mask_excludes_targets() {
    let mut world = EmotionWorld::default();
    world.spawn_with_profile(joyful(), at(0.0));
    let hidden = world.spawn_with_profile(villager(), at(1.0));
    assert!(world.set_layer(hidden, pathos_core::LayerMask(0b10)));
    assert!(world.plan_influence().is_empty());

    assert!(world.set_layer(hidden, pathos_core::LayerMask::DEFAULT));
    assert!(world.set_enabled(hidden, false));
    assert!(world.plan_influence().is_empty());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[test]
fn scene_subscribers_see_every_actor() {
    init_tracing();
    let mut world = EmotionWorld::default();
    let a = world.spawn_with_profile(villager(), at(0.0));
    let b = world.spawn_with_profile(villager(), at(50.0));

    let scene = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scene);
    world.subscribe_scene(move |e| sink.borrow_mut().push((e.actor, e.new_emotion)));

    let own = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&own);
    world.subscribe_actor(a, move |_| *counter.borrow_mut() += 1);

    let signals = Rc::new(RefCell::new(Vec::new()));
    let signal_sink = Rc::clone(&signals);
    world.subscribe_signals(move |e| {
        if let CoreEvent::Threshold(t) = e {
            signal_sink.borrow_mut().push(t.behavior.clone());
        }
    });

    world.send_stimulus(a, EmotionalStimulus::new(StimulusKind::Gift, 1.0));
    world.send_stimulus(b, EmotionalStimulus::new(StimulusKind::Insult, 1.0));
    world.send_stimulus(b, EmotionalStimulus::new(StimulusKind::Insult, 1.0));

    assert_eq!(
        scene.borrow().as_slice(),
        &[(a, Emotion::HAPPY), (b, Emotion::ANGRY)]
    );
    assert_eq!(*own.borrow(), 1);
    assert_eq!(signals.borrow().as_slice(), &["lash_out".to_string()]);
}

#[test]
fn decay_changes_reach_scene_subscribers() {
    let mut world = EmotionWorld::default();
    let id = world.spawn_with_profile(villager(), at(0.0));
    world.send_stimulus(id, EmotionalStimulus::new(StimulusKind::Gift, 1.0));

    let seen = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&seen);
    world.subscribe_scene(move |_| *sink.borrow_mut() += 1);

    let report = world.step(0.2);
    assert_eq!(report.decay_ticks, 1);
    assert_eq!(*seen.borrow(), 1);
}

// ---------------------------------------------------------------------------
// Ordering & timers
// ---------------------------------------------------------------------------

#[test]
fn queued_stimuli_apply_in_arrival_order() {
    let mut world = EmotionWorld::default();
    let first = world.spawn_with_profile(villager(), at(0.0));
    let second = world.spawn_with_profile(villager(), at(50.0));

    world.enqueue_stimulus(first, EmotionalStimulus::new(StimulusKind::Gift, 1.0));
    world.enqueue_stimulus(first, EmotionalStimulus::new(StimulusKind::Insult, 1.0));
    world.enqueue_stimulus(second, EmotionalStimulus::new(StimulusKind::Insult, 1.0));
    world.enqueue_stimulus(second, EmotionalStimulus::new(StimulusKind::Gift, 1.0));
    assert_eq!(world.queued(), 4);
    assert_eq!(world.current_state(first).map(|s| s.emotion), Some(Emotion::NEUTRAL));

    let report = world.step(0.0);
    assert_eq!(report.queued, 4);
    assert_eq!(world.queued(), 0);
    assert_eq!(world.current_state(first).map(|s| s.emotion), Some(Emotion::ANGRY));
    assert_eq!(world.current_state(second).map(|s| s.emotion), Some(Emotion::HAPPY));
}

#[test]
fn deferred_reaction_fires_after_its_delay() {
    init_tracing();
    let mut world = EmotionWorld::default();
    let id = world.spawn_with_profile(villager(), at(0.0));

    let outcome = world.handle_event(&hooks::on_loss(id, 1.0));
    assert_eq!(outcome, 1);
    assert_eq!(world.pending_deferred(), 1);
    assert_eq!(world.current_state(id).map(|s| s.emotion), Some(Emotion::NEUTRAL));

    world.step(0.5);
    assert_eq!(world.current_state(id).map(|s| s.emotion), Some(Emotion::NEUTRAL));
    let report = world.step(0.5);
    assert_eq!(report.deferred, 1);
    assert_eq!(world.current_state(id).map(|s| s.emotion), Some(Emotion::SAD));
}

#[test]
fn despawn_cancels_deferred_reactions() {
    let mut world = EmotionWorld::default();
    let id = world.spawn_with_profile(villager(), at(0.0));
    let outcome = world.send_stimulus(id, EmotionalStimulus::new(StimulusKind::Loss, 1.0));
    assert!(matches!(outcome, StimulusOutcome::Deferred { .. }));
    world.enqueue_stimulus(id, EmotionalStimulus::new(StimulusKind::Gift, 1.0));

    assert!(world.despawn(id));
    assert_eq!(world.pending_deferred(), 0);
    assert_eq!(world.queued(), 0);

    let report = world.step(2.0);
    assert_eq!(report.deferred, 0);
    assert_eq!(report.queued, 0);
    assert!(!world.despawn(id));
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

#[test]
fn attack_frightens_defender_and_alarms_witnesses() {
    let mut world = EmotionWorld::default();
    let attacker = world.spawn_with_profile(villager(), at(0.0));
    let defender = world.spawn_with_profile(villager(), at(1.0));
    let witness = world.spawn_with_profile(villager(), at(3.0));

    let delivered = world.handle_event(&hooks::on_attack(attacker, defender, vec![witness]));
    assert_eq!(delivered, 2);

    assert_eq!(world.current_state(defender).map(|s| s.emotion), Some(Emotion::FEARFUL));
    assert_eq!(world.current_state(witness).map(|s| s.emotion), Some(Emotion::ANXIOUS));
    assert_eq!(world.current_state(attacker).map(|s| s.emotion), Some(Emotion::NEUTRAL));
    assert!(world.get_impression_of(defender, attacker) < 0.0);
    assert!(world.get_impression_of(witness, attacker) < 0.0);
}

#[test]
fn context_rule_escalates_anger() {
    let mut world = EmotionWorld::default();
    let bully = world.spawn_with_profile(villager(), at(0.0));
    let victim = world.spawn_with_profile(villager(), at(1.0));

    world.handle_event(&hooks::on_insult(bully, victim, Vec::new()));
    world.handle_event(&hooks::on_threat(bully, victim));
    assert_eq!(world.current_state(victim).map(|s| s.emotion), Some(Emotion::FURIOUS));
}

#[test]
fn gifts_build_a_positive_impression() {
    let mut world = EmotionWorld::default();
    let giver = world.spawn_with_profile(villager(), at(0.0));
    let receiver = world.spawn_with_profile(villager(), at(1.0));

    world.handle_event(&hooks::on_gift(giver, receiver, 0.8));
    assert!(world.get_impression_of(receiver, giver) > 0.0);
    assert!(world.get_impression_of(giver, receiver).abs() < f32::EPSILON);
}

#[test]
fn direct_interactions_shape_relationships() {
    init_tracing();
    let mut world = EmotionWorld::default();
    let giver = world.spawn_with_profile(villager(), at(0.0));
    let receiver = world.spawn_with_profile(villager(), at(1.0));
    let fresh = world.get_relationship(receiver, giver);

    world.handle_event(&hooks::on_gift(giver, receiver, 1.0));
    let after_gift = world.get_relationship(receiver, giver);
    assert!(after_gift.score > fresh.score);
    assert!(after_gift.familiarity > fresh.familiarity);

    world.handle_event(&hooks::on_insult(giver, receiver, Vec::new()));
    let after_insult = world.get_relationship(receiver, giver);
    assert!(after_insult.score < after_gift.score);
    assert!(after_insult.familiarity > after_gift.familiarity);

    // The giver felt nothing, so its view of the receiver is untouched.
    assert_eq!(world.get_relationship(giver, receiver), fresh);
}

// ---------------------------------------------------------------------------
// Configuration from files
// ---------------------------------------------------------------------------

#[test]
fn world_loads_config_and_profiles_from_files() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("pathos.toml");
    let profiles_path = dir.path().join("profiles.toml");

    let mut config = std::fs::File::create(&config_path).expect("create config");
    writeln!(
        config,
        "[simulation]\ntick_interval = 0.5\n\n[influence]\nenabled = false\n\n[memory]\ncapacity = 4"
    )
    .expect("write config");
    let mut profiles = std::fs::File::create(&profiles_path).expect("create profiles");
    writeln!(
        profiles,
        r#"
[[profile]]
name = "guard"
baseline_intensity = 0.4

[profile.traits]
dominant = "CALM"
resistant = "FEARFUL"

[[profile.rules]]
stimulus = "threat"
resulting = "FEARFUL"
intensity_delta = 0.8
"#
    )
    .expect("write profiles");

    let mut world = EmotionWorld::from_files(&config_path, &profiles_path).expect("world loads");
    assert!((world.config().simulation.tick_interval - 0.5).abs() < f32::EPSILON);
    assert_eq!(world.config().memory.capacity, 4);

    let guard = world.spawn("guard", at(0.0));
    let state = world.try_state(guard).expect("guard exists");
    assert_eq!(state.emotion, Emotion::CALM);
    assert!((state.intensity - 0.4).abs() < 1e-6);

    world.send_stimulus(guard, EmotionalStimulus::new(StimulusKind::Threat, 1.0));
    let state = world.try_state(guard).expect("guard exists");
    assert_eq!(state.emotion, Emotion::FEARFUL);
    assert!((state.intensity - 0.4).abs() < 1e-6, "resistance halves the reaction");

    let report = world.step(0.5);
    assert_eq!(report.decay_ticks, 1);
    assert_eq!(report.influence_passes, 0);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("pathos.toml");
    let profiles_path = dir.path().join("profiles.toml");
    std::fs::write(&config_path, "[simulation]\ntick_interval = 0.0\n").expect("write config");
    std::fs::write(&profiles_path, "").expect("write profiles");

    let result = EmotionWorld::from_files(&config_path, &profiles_path);
    assert!(matches!(result, Err(PathosError::Config(_))));

    let missing = EmotionWorld::from_files(&dir.path().join("absent.toml"), &profiles_path);
    assert!(matches!(missing, Err(PathosError::Io(_))));
}

#[test]
fn unknown_profile_yields_inert_actor() {
    let mut world = EmotionWorld::new(PathosConfig::default());
    let ghost = world.spawn("missing", at(0.0));
    assert_eq!(
        world.send_stimulus(ghost, EmotionalStimulus::new(StimulusKind::Gift, 1.0)),
        StimulusOutcome::Ignored
    );
    world.step(1.0);
    assert_eq!(world.current_state(ghost).map(|s| s.intensity), Some(0.0));
}
