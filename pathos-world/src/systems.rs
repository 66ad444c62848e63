//! Simulation systems for the PATHOS emotion layer.
//!
//! Standalone functions over the [`ActorTable`]; [`EmotionWorld::step`]
//! calls them in a fixed order.
//!
//! ## System Budget (per step):
//!
//! | System          | Budget   | Frequency              |
//! |-----------------|----------|------------------------|
//! | Stimulus intake | 5μs each | On event / queued      |
//! | Decay           | 0.1ms    | Every tick interval    |
//! | Influence       | 1ms      | Every influence pass   |
//!
//! [`EmotionWorld::step`]: crate::world::EmotionWorld::step

use pathos_core::influence::ActorSnapshot;
use pathos_core::{ActorId, EmotionalStimulus, GameTimestamp, Location, StimulusKind};

use crate::components::ActorTable;
use crate::events::GameEvent;

/// Potency of a greeting for its listener.
pub const GREETING_POTENCY: f32 = 0.5;
/// Potency of a compliment for its target.
pub const COMPLIMENT_POTENCY: f32 = 0.6;
/// Potency of an insult for its target.
pub const INSULT_POTENCY: f32 = 0.8;
/// Potency of an insult for bystanders.
pub const INSULT_WITNESS_POTENCY: f32 = 0.3;
/// Potency of an attack for its defender.
pub const ATTACK_POTENCY: f32 = 1.0;
/// Potency of the threat bystanders perceive when witnessing an attack.
pub const ATTACK_WITNESS_POTENCY: f32 = 0.6;
/// Potency of a threat for its target.
pub const THREAT_POTENCY: f32 = 0.8;

/// Run one decay tick for every actor.
///
/// Performance target: < 0.1ms for 500 actors.
pub fn run_decay(actors: &mut ActorTable, dt: f32, now: &GameTimestamp) {
    actors.for_each_mut(|actor| actor.core.tick(dt, now));
}

/// Snapshot every live actor for an influence pass, in spawn order.
#[must_use]
pub fn snapshot_actors(actors: &ActorTable) -> Vec<ActorSnapshot> {
    actors.iter().filter_map(|actor| actor.snapshot()).collect()
}

/// Translate a game event into the stimuli it delivers, in delivery order.
///
/// Actors named by the event but absent from the table are skipped. Area
/// events reach every live actor within the radius except their source,
/// with potency falling off linearly to zero at the edge.
#[must_use]
pub fn event_deliveries(event: &GameEvent, actors: &ActorTable) -> Vec<(ActorId, EmotionalStimulus)> {
    let source = event.source();
    let origin = source
        .and_then(|id| actors.get(id))
        .map(|actor| actor.location);

    let make = |target: ActorId, kind: StimulusKind, potency: f32| {
        if !actors.contains(target) || Some(target) == source {
            return None;
        }
        let mut stimulus = EmotionalStimulus::new(kind, potency).to_actor(target);
        if let Some(source) = source {
            stimulus = stimulus.from_actor(source);
        }
        if let Some(origin) = origin {
            stimulus = stimulus.at(origin);
        }
        Some((target, stimulus))
    };

    let mut out = Vec::new();
    match event {
        GameEvent::Greeting { listener, .. } => {
            out.extend(make(*listener, StimulusKind::Greeting, GREETING_POTENCY));
        }
        GameEvent::Gift { receiver, value, .. } => {
            out.extend(make(*receiver, StimulusKind::Gift, *value));
        }
        GameEvent::Compliment { target, .. } => {
            out.extend(make(*target, StimulusKind::Compliment, COMPLIMENT_POTENCY));
        }
        GameEvent::Insult {
            target, witnesses, ..
        } => {
            out.extend(make(*target, StimulusKind::Insult, INSULT_POTENCY));
            for witness in witnesses.iter().filter(|w| *w != target) {
                out.extend(make(*witness, StimulusKind::Insult, INSULT_WITNESS_POTENCY));
            }
        }
        GameEvent::Attack {
            defender,
            witnesses,
            ..
        } => {
            out.extend(make(*defender, StimulusKind::Attack, ATTACK_POTENCY));
            for witness in witnesses.iter().filter(|w| *w != defender) {
                out.extend(make(*witness, StimulusKind::Threat, ATTACK_WITNESS_POTENCY));
            }
        }
        GameEvent::Threat { target, .. } => {
            out.extend(make(*target, StimulusKind::Threat, THREAT_POTENCY));
        }
        GameEvent::Loss { actor, severity } => {
            out.extend(make(*actor, StimulusKind::Loss, *severity));
        }
        GameEvent::LoudNoise {
            origin,
            loudness,
            radius,
        } => {
            for (id, potency) in within_radius(actors, *origin, *radius, *loudness) {
                out.extend(
                    make(id, StimulusKind::LoudNoise, potency).map(|(id, s)| (id, s.at(*origin))),
                );
            }
        }
        GameEvent::Skill {
            name,
            target: Some(target),
            potency,
            ..
        } => out.extend(make(*target, StimulusKind::Skill(name.clone()), *potency)),
        GameEvent::Skill {
            name,
            target: None,
            origin,
            radius,
            potency,
            ..
        } => {
            for (id, falloff) in within_radius(actors, *origin, *radius, *potency) {
                out.extend(make(id, StimulusKind::Skill(name.clone()), falloff));
            }
        }
        GameEvent::Custom {
            kind,
            targets,
            potency,
            ..
        } => {
            for target in targets {
                out.extend(make(*target, StimulusKind::Custom(kind.clone()), *potency));
            }
        }
    }
    out
}

/// Live actors within `radius` of `origin`, with linearly falling potency.
fn within_radius(actors: &ActorTable, origin: Location, radius: f32, potency: f32) -> Vec<(ActorId, f32)> {
    if radius <= 0.0 {
        return Vec::new();
    }
    actors
        .iter()
        .filter(|actor| actor.is_live())
        .filter_map(|actor| {
            let distance = origin.distance(&actor.location);
            (distance <= radius).then(|| (actor.id(), potency * (1.0 - distance / radius)))
        })
        .filter(|(_, p)| *p > 0.0)
        .collect()
}
