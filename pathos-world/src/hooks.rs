//! Integration hooks: thin constructors a host game calls from its own
//! dialogue, combat, inventory and ability systems.

use pathos_core::{ActorId, Location};

use crate::events::GameEvent;

/// Create a greeting event from the host's dialogue system.
#[must_use]
pub fn on_greeting(speaker: ActorId, listener: ActorId) -> GameEvent {
    GameEvent::Greeting { speaker, listener }
}

/// Create a gift event from the host's trade or inventory system.
#[must_use]
pub fn on_gift(giver: ActorId, receiver: ActorId, value: f32) -> GameEvent {
    GameEvent::Gift {
        giver,
        receiver,
        value: value.clamp(0.0, 1.0),
    }
}

/// Create a compliment event.
#[must_use]
pub fn on_compliment(speaker: ActorId, target: ActorId) -> GameEvent {
    GameEvent::Compliment { speaker, target }
}

/// Create an insult event.
#[must_use]
pub fn on_insult(speaker: ActorId, target: ActorId, witnesses: Vec<ActorId>) -> GameEvent {
    GameEvent::Insult {
        speaker,
        target,
        witnesses,
    }
}

/// Create an attack event from the host's combat system.
#[must_use]
pub fn on_attack(attacker: ActorId, defender: ActorId, witnesses: Vec<ActorId>) -> GameEvent {
    GameEvent::Attack {
        attacker,
        defender,
        witnesses,
    }
}

/// Create a threat event.
#[must_use]
pub fn on_threat(source: ActorId, target: ActorId) -> GameEvent {
    GameEvent::Threat { source, target }
}

/// Create a loss event (death of a companion, stolen property, ...).
#[must_use]
pub fn on_loss(actor: ActorId, severity: f32) -> GameEvent {
    GameEvent::Loss {
        actor,
        severity: severity.clamp(0.0, 1.0),
    }
}

/// Create a loud-noise event (explosion, thunder, alarm bell).
#[must_use]
pub fn on_loud_noise(origin: Location, loudness: f32, radius: f32) -> GameEvent {
    GameEvent::LoudNoise {
        origin,
        loudness: loudness.clamp(0.0, 1.0),
        radius: radius.max(0.0),
    }
}

/// Create a targeted skill event from the host's ability system.
#[must_use]
pub fn on_skill(caster: ActorId, name: impl Into<String>, target: ActorId, potency: f32) -> GameEvent {
    GameEvent::Skill {
        caster,
        name: name.into(),
        target: Some(target),
        origin: Location::default(),
        radius: 0.0,
        potency: potency.clamp(0.0, 1.0),
    }
}

/// Create an area skill event centered on `origin`.
#[must_use]
pub fn on_area_skill(
    caster: ActorId,
    name: impl Into<String>,
    origin: Location,
    radius: f32,
    potency: f32,
) -> GameEvent {
    GameEvent::Skill {
        caster,
        name: name.into(),
        target: None,
        origin,
        radius: radius.max(0.0),
        potency: potency.clamp(0.0, 1.0),
    }
}

/// Create a game-defined event.
#[must_use]
pub fn on_custom(
    kind: impl Into<String>,
    source: Option<ActorId>,
    targets: Vec<ActorId>,
    potency: f32,
) -> GameEvent {
    GameEvent::Custom {
        kind: kind.into(),
        source,
        targets,
        potency: potency.clamp(0.0, 1.0),
    }
}
