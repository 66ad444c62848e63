//! Property-based tests for whole-scene invariants.

use std::sync::Arc;

use proptest::prelude::*;

use pathos_core::{Emotion, EmotionProfile, EmotionTraits, Location, ReactionRule, StimulusKind};
use pathos_world::{hooks, EmotionWorld, GameEvent};

const ACTORS: usize = 4;

fn profile() -> Arc<EmotionProfile> {
    Arc::new(
        EmotionProfile::new("townsfolk")
            .with_traits(EmotionTraits::new(
                Emotion::CALM,
                Emotion::FEARFUL,
                Emotion::ANGRY,
                0.4,
                0.9,
            ))
            .with_sensitivity(2.0)
            .with_rule(ReactionRule::new(StimulusKind::Gift, Emotion::JOYFUL, 1.0).sustained(2.0))
            .with_rule(ReactionRule::new(StimulusKind::Insult, Emotion::ANGRY, 1.0))
            .with_rule(ReactionRule::new(StimulusKind::Attack, Emotion::FEARFUL, 1.0).delayed(0.4))
            .with_rule(ReactionRule::new(StimulusKind::Threat, Emotion::ANXIOUS, 0.7))
            .with_rule(ReactionRule::new(StimulusKind::LoudNoise, Emotion::SURPRISED, 0.9))
            .with_rule(ReactionRule::new(StimulusKind::from_emotion(Emotion::ANGRY), Emotion::ANGRY, 1.0).modifying())
            .with_rule(ReactionRule::new(StimulusKind::from_emotion(Emotion::HAPPY), Emotion::HAPPY, 0.5)),
    )
}

#[derive(Debug, Clone)]
enum Action {
    Gift(usize, usize, f32),
    Insult(usize, usize),
    Attack(usize, usize),
    Noise(f32, f32),
    Step(f32),
    Despawn(usize),
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..ACTORS, 0..ACTORS, 0.0..1.0f32).prop_map(|(a, b, v)| Action::Gift(a, b, v)),
        (0..ACTORS, 0..ACTORS).prop_map(|(a, b)| Action::Insult(a, b)),
        (0..ACTORS, 0..ACTORS).prop_map(|(a, b)| Action::Attack(a, b)),
        (0.0..1.0f32, 0.0..20.0f32).prop_map(|(l, r)| Action::Noise(l, r)),
        (0.0..2.0f32).prop_map(Action::Step),
        (0..ACTORS).prop_map(Action::Despawn),
    ]
}

proptest! {
    #[test]
    fn scene_values_stay_in_range(actions in prop::collection::vec(arb_action(), 1..80)) {
        let mut world = EmotionWorld::default();
        let profile = profile();
        let ids: Vec<_> = (0..ACTORS)
            .map(|i| world.spawn_with_profile(Arc::clone(&profile), Location::new(i as f32 * 3.0, 0.0, 0.0)))
            .collect();

        for action in actions {
            let event: Option<GameEvent> = match action {
                Action::Gift(a, b, v) => Some(hooks::on_gift(ids[a], ids[b], v)),
                Action::Insult(a, b) => Some(hooks::on_insult(ids[a], ids[b], ids.clone())),
                Action::Attack(a, b) => Some(hooks::on_attack(ids[a], ids[b], ids.clone())),
                Action::Noise(l, r) => Some(hooks::on_loud_noise(Location::default(), l, r)),
                Action::Step(dt) => {
                    world.step(dt);
                    None
                }
                Action::Despawn(i) => {
                    world.despawn(ids[i]);
                    None
                }
            };
            if let Some(event) = event {
                world.handle_event(&event);
            }

            for &id in &ids {
                if let Some(state) = world.current_state(id) {
                    prop_assert!((0.0..=1.0).contains(&state.intensity));
                }
                for (_, relationship) in world.relationships().relationships_of(id) {
                    prop_assert!((-1.0..=1.0).contains(&relationship.score));
                    prop_assert!((0.0..=1.0).contains(&relationship.familiarity));
                }
                for &other in &ids {
                    prop_assert!((-1.0..=1.0).contains(&world.get_impression_of(id, other)));
                }
            }
        }
    }
}
