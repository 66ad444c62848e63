//! Scenario tests: one actor's emotion core driven end to end.

use std::sync::Arc;

use pathos_core::config::MemoryConfig;
use pathos_core::events::{ChangeSource, EmotionChangeEvent};
use pathos_core::memory::EmotionMemory;
use pathos_core::stimulus::StimulusEffect;
use pathos_core::{
    ActorId, Emotion, EmotionCore, EmotionProfile, EmotionTraits, EmotionalStimulus, GameTimestamp,
    PathosConfig, ProfileLibrary, ReactionRule, StimulusKind, StimulusOutcome,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ts(seconds: f64) -> GameTimestamp {
    GameTimestamp::at(0, seconds)
}

fn scenario_profile() -> Arc<EmotionProfile> {
    Arc::new(
        EmotionProfile::new("scenario")
            .with_baseline(0.3)
            .with_decay_rate(0.1)
            .with_sensitivity(1.0)
            .with_rule(ReactionRule::new(
                StimulusKind::Custom("x".into()),
                Emotion::HAPPY,
                0.5,
            )),
    )
}

fn scenario_core() -> EmotionCore {
    EmotionCore::new(ActorId::new(), Some(scenario_profile()), &PathosConfig::default())
}

// ---------------------------------------------------------------------------
// Scenario A / B: react, then fade back to baseline
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_stimulus_yields_happy_half() {
    let mut core = scenario_core();
    let stimulus = EmotionalStimulus::new(StimulusKind::Custom("x".into()), 1.0);

    assert_eq!(core.process_stimulus(&stimulus, &ts(0.0)), StimulusOutcome::Applied);
    let state = core.current_state();
    assert_eq!(state.emotion, Emotion::HAPPY);
    assert!((state.intensity - 0.5).abs() < 1e-6);
}

#[test]
fn scenario_b_twenty_ticks_fade_then_reset() {
    init_tracing();
    let mut core = scenario_core();
    core.process_stimulus(&EmotionalStimulus::new(StimulusKind::Custom("x".into()), 1.0), &ts(0.0));

    let mut history = vec![core.current_state()];
    for tick in 1..=20 {
        core.tick(0.2, &ts(f64::from(tick) * 0.2));
        history.push(core.current_state());
    }

    let reset_at = history
        .iter()
        .position(|s| s.emotion == Emotion::NEUTRAL)
        .expect("state resets within 20 ticks");
    for pair in history[..reset_at].windows(2) {
        assert!(pair[1].intensity <= pair[0].intensity);
    }
    for state in &history[reset_at..] {
        assert_eq!(state.emotion, Emotion::NEUTRAL);
        assert!((state.intensity - 0.3).abs() < 1e-6);
    }
}

#[test]
fn reset_is_reported_as_baseline_reset() {
    let mut core = scenario_core().collecting_events();
    core.process_stimulus(&EmotionalStimulus::new(StimulusKind::Custom("x".into()), 1.0), &ts(0.0));
    for _ in 0..20 {
        core.tick(0.2, &ts(0.0));
    }
    let sources: Vec<ChangeSource> = core
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            pathos_core::events::CoreEvent::Changed(change) => Some(change.source),
            _ => None,
        })
        .collect();
    assert_eq!(sources.first(), Some(&ChangeSource::Stimulus));
    assert_eq!(sources.last(), Some(&ChangeSource::BaselineReset));
}

// ---------------------------------------------------------------------------
// Trait filtering and rule precedence
// ---------------------------------------------------------------------------

#[test]
fn resistant_actor_halves_anger() {
    let insult = ReactionRule::new(StimulusKind::Insult, Emotion::ANGRY, 0.9);
    let plain = Arc::new(EmotionProfile::new("plain").with_rule(insult.clone()));
    let monk = Arc::new(
        EmotionProfile::new("monk")
            .with_traits(EmotionTraits::new(Emotion::CALM, Emotion::NEUTRAL, Emotion::ANGRY, 0.9, 1.0))
            .with_rule(insult),
    );
    let config = PathosConfig::default();
    let stimulus = EmotionalStimulus::new(StimulusKind::Insult, 1.0);

    let mut a = EmotionCore::new(ActorId::new(), Some(plain), &config);
    let mut b = EmotionCore::new(ActorId::new(), Some(monk), &config);
    a.process_stimulus(&stimulus, &ts(0.0));
    b.process_stimulus(&stimulus, &ts(0.0));

    assert!(b.current_state().intensity <= 0.5 * a.current_state().intensity + 1e-6);
}

#[test]
fn baseline_reset_is_trait_filtered() {
    let shy = Arc::new(
        EmotionProfile::new("shy")
            .with_traits(EmotionTraits::new(Emotion::CALM, Emotion::NEUTRAL, Emotion::NEUTRAL, 0.5, 0.5))
            .with_baseline(0.6),
    );
    let core = EmotionCore::new(ActorId::new(), Some(shy), &PathosConfig::default());
    let state = core.current_state();
    assert_eq!(state.emotion, Emotion::CALM);
    assert!((state.intensity - 0.3).abs() < 1e-6);
}

#[test]
fn rule_keyed_to_current_emotion_wins() {
    let profile = Arc::new(
        EmotionProfile::new("guard")
            .with_traits(EmotionTraits::new(Emotion::CALM, Emotion::NEUTRAL, Emotion::NEUTRAL, 0.5, 1.0))
            .with_rule(ReactionRule::new(StimulusKind::LoudNoise, Emotion::SURPRISED, 0.4))
            .with_rule(ReactionRule::new(StimulusKind::LoudNoise, Emotion::ANGRY, 0.4).when(Emotion::CALM)),
    );
    let mut core = EmotionCore::new(ActorId::new(), Some(profile), &PathosConfig::default());
    core.process_stimulus(&EmotionalStimulus::new(StimulusKind::LoudNoise, 1.0), &ts(0.0));
    assert_eq!(core.current_state().emotion, Emotion::ANGRY);

    // No longer calm: the wildcard applies.
    core.process_stimulus(&EmotionalStimulus::new(StimulusKind::LoudNoise, 1.0), &ts(0.0));
    assert_eq!(core.current_state().emotion, Emotion::SURPRISED);
}

// ---------------------------------------------------------------------------
// Memory (Scenario D)
// ---------------------------------------------------------------------------

fn change(intensity: f32, seconds: f64) -> EmotionChangeEvent {
    EmotionChangeEvent {
        actor: ActorId::new(),
        old_emotion: Emotion::NEUTRAL,
        old_intensity: 0.0,
        new_emotion: Emotion::HAPPY,
        new_intensity: intensity,
        source: ChangeSource::Stimulus,
        stimulus: None,
        timestamp: ts(seconds),
    }
}

#[test]
fn scenario_d_capacity_three_keeps_latest_three() {
    let mut memory = EmotionMemory::new(
        MemoryConfig {
            capacity: 3,
            ..MemoryConfig::default()
        },
        0.1,
    );
    let events = [change(0.2, 1.0), change(0.4, 2.0), change(0.6, 3.0), change(0.8, 4.0)];
    for event in &events {
        assert!(memory.record_event(event));
    }

    let kept: Vec<f64> = memory.records().map(|r| r.created_at.seconds).collect();
    assert_eq!(kept, vec![4.0, 3.0, 2.0]);
    assert_eq!(memory.len(), 3);
}

#[test]
fn memory_attributes_feelings_to_their_cause() {
    let mut core = EmotionCore::new(
        ActorId::new(),
        Some(Arc::new(
            EmotionProfile::new("merchant")
                .with_rule(ReactionRule::new(StimulusKind::Insult, Emotion::ANGRY, 0.7))
                .with_rule(ReactionRule::new(StimulusKind::Gift, Emotion::HAPPY, 0.4)),
        )),
        &PathosConfig::default(),
    );
    let rude = ActorId::new();
    let kind = ActorId::new();

    core.process_stimulus(&EmotionalStimulus::new(StimulusKind::Insult, 1.0).from_actor(rude), &ts(1.0));
    core.process_stimulus(&EmotionalStimulus::new(StimulusKind::Gift, 1.0).from_actor(kind), &ts(2.0));

    let memory = core.memory();
    assert_eq!(memory.dominant_emotion_toward(rude), Emotion::ANGRY);
    assert_eq!(memory.dominant_emotion_toward(kind), Emotion::HAPPY);
    assert!(core.impression_of(rude) < 0.0);
    assert!(core.impression_of(kind) > 0.0);
    assert!(memory.has_caused_emotion_recently(rude, Emotion::ANGRY, 5.0, &ts(3.0)));
    assert!(!memory.has_caused_emotion_recently(rude, Emotion::ANGRY, 1.0, &ts(3.0)));
}

// ---------------------------------------------------------------------------
// Profiles from TOML
// ---------------------------------------------------------------------------

#[test]
fn profile_library_drives_a_core() {
    init_tracing();
    let library = ProfileLibrary::from_toml(
        r#"
        [[profile]]
        name = "bard"
        baseline_intensity = 0.2

        [profile.traits]
        dominant = "HAPPY"
        vulnerable = "SAD"

        [[profile.rules]]
        stimulus = "loss"
        resulting = "SAD"
        intensity_delta = 0.4

        [[profile.thresholds]]
        name = "weep"
        emotion = "SAD"
        min_intensity = 0.5
        one_shot = true
        "#,
    )
    .expect("valid profiles");

    let bard = library.get("bard").expect("bard profile");
    let mut core = EmotionCore::new(ActorId::new(), Some(bard), &PathosConfig::default())
        .collecting_events();
    assert_eq!(core.current_state().emotion, Emotion::HAPPY);

    let loss = EmotionalStimulus::new(StimulusKind::Loss, 1.0)
        .with_primary(StimulusEffect::new(Emotion::SAD, 1.0, 0.0));
    core.process_stimulus(&loss, &ts(0.0));
    let state = core.current_state();
    assert_eq!(state.emotion, Emotion::SAD);
    assert!((state.intensity - 0.6).abs() < 1e-5);

    let thresholds = core
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, pathos_core::events::CoreEvent::Threshold(_)))
        .count();
    assert_eq!(thresholds, 1);
    assert!(library.get("nobody").is_err());
}
