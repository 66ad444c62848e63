//! Game events that produce emotional stimuli.
//!
//! Events name who did what to whom; the world turns them into stimuli for
//! the affected actors (see [`crate::systems::event_deliveries`]). Area
//! events reach every live actor within their radius.

use serde::{Deserialize, Serialize};

use pathos_core::{ActorId, Location};

/// A game event that can trigger emotional reactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// One actor greeted another.
    Greeting {
        speaker: ActorId,
        listener: ActorId,
    },

    /// One actor gave another a gift.
    Gift {
        giver: ActorId,
        receiver: ActorId,
        /// Perceived value in [0, 1]; becomes the stimulus potency.
        value: f32,
    },

    /// One actor praised another.
    Compliment {
        speaker: ActorId,
        target: ActorId,
    },

    /// One actor insulted another in front of witnesses.
    Insult {
        speaker: ActorId,
        target: ActorId,
        witnesses: Vec<ActorId>,
    },

    /// One actor attacked another in front of witnesses.
    Attack {
        attacker: ActorId,
        defender: ActorId,
        witnesses: Vec<ActorId>,
    },

    /// One actor threatened another.
    Threat {
        source: ActorId,
        target: ActorId,
    },

    /// An actor lost something or someone.
    Loss {
        actor: ActorId,
        /// How hard the loss hits, in [0, 1].
        severity: f32,
    },

    /// A loud noise everyone nearby hears.
    LoudNoise {
        origin: Location,
        /// Potency at the origin, in [0, 1].
        loudness: f32,
        radius: f32,
    },

    /// A player skill, either targeted or an area effect around `origin`.
    Skill {
        caster: ActorId,
        name: String,
        target: Option<ActorId>,
        origin: Location,
        radius: f32,
        potency: f32,
    },

    /// Game-defined event delivered to explicit targets.
    Custom {
        kind: String,
        source: Option<ActorId>,
        targets: Vec<ActorId>,
        potency: f32,
    },
}

impl GameEvent {
    /// Actor responsible for the event, if any.
    #[must_use]
    pub fn source(&self) -> Option<ActorId> {
        match self {
            Self::Greeting { speaker, .. }
            | Self::Compliment { speaker, .. }
            | Self::Insult { speaker, .. } => Some(*speaker),
            Self::Gift { giver, .. } => Some(*giver),
            Self::Attack { attacker, .. } => Some(*attacker),
            Self::Threat { source, .. } => Some(*source),
            Self::Skill { caster, .. } => Some(*caster),
            Self::Custom { source, .. } => *source,
            Self::Loss { .. } | Self::LoudNoise { .. } => None,
        }
    }

    /// Every actor named by the event. Area events name only their source.
    #[must_use]
    pub fn participants(&self) -> Vec<ActorId> {
        match self {
            Self::Greeting { speaker, listener } => vec![*speaker, *listener],
            Self::Gift { giver, receiver, .. } => vec![*giver, *receiver],
            Self::Compliment { speaker, target } => vec![*speaker, *target],
            Self::Insult {
                speaker,
                target,
                witnesses,
            } => {
                let mut ids = vec![*speaker, *target];
                ids.extend(witnesses);
                ids
            }
            Self::Attack {
                attacker,
                defender,
                witnesses,
            } => {
                let mut ids = vec![*attacker, *defender];
                ids.extend(witnesses);
                ids
            }
            Self::Threat { source, target } => vec![*source, *target],
            Self::Loss { actor, .. } => vec![*actor],
            Self::LoudNoise { .. } => Vec::new(),
            Self::Skill { caster, target, .. } => {
                let mut ids = vec![*caster];
                ids.extend(target);
                ids
            }
            Self::Custom { source, targets, .. } => {
                let mut ids: Vec<ActorId> = source.iter().copied().collect();
                ids.extend(targets);
                ids
            }
        }
    }

    /// Center and radius for area events.
    #[must_use]
    pub fn area(&self) -> Option<(Location, f32)> {
        match self {
            Self::LoudNoise { origin, radius, .. } => Some((*origin, *radius)),
            Self::Skill {
                target: None,
                origin,
                radius,
                ..
            } => Some((*origin, *radius)),
            _ => None,
        }
    }
}
