//! Per-actor components and the table that owns them.

use std::collections::HashMap;

use pathos_core::influence::ActorSnapshot;
use pathos_core::{ActorId, EmotionCore, LayerMask, Location};

/// One simulated actor: its emotion core plus the spatial data the influence
/// pass and area events need.
#[derive(Debug)]
pub struct Actor {
    /// The actor's emotion core.
    pub core: EmotionCore,
    /// Current position.
    pub location: Location,
    /// Layers the actor lives on.
    pub layer: LayerMask,
    /// Disabled actors neither radiate nor receive influence.
    pub enabled: bool,
}

impl Actor {
    /// Wrap a core at `location` on the default layer.
    #[must_use]
    pub fn new(core: EmotionCore, location: Location) -> Self {
        Self {
            core,
            location,
            layer: LayerMask::DEFAULT,
            enabled: true,
        }
    }

    /// Actor id.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.core.actor()
    }

    /// Whether the actor takes part in the simulation.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.enabled && self.core.is_enabled()
    }

    /// Snapshot for the influence pass; `None` for non-live actors.
    #[must_use]
    pub fn snapshot(&self) -> Option<ActorSnapshot> {
        if !self.is_live() {
            return None;
        }
        let state = self.core.current_state();
        Some(ActorSnapshot {
            id: self.id(),
            location: self.location,
            layer: self.layer,
            emotion: state.emotion,
            intensity: state.intensity,
        })
    }
}

/// Actors keyed by id, iterated in spawn order.
#[derive(Debug, Default)]
pub struct ActorTable {
    actors: HashMap<ActorId, Actor>,
    order: Vec<ActorId>,
}

impl ActorTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor, replacing any previous one with the same id.
    pub fn insert(&mut self, actor: Actor) {
        let id = actor.id();
        if self.actors.insert(id, actor).is_none() {
            self.order.push(id);
        }
    }

    /// Remove an actor.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let removed = self.actors.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(removed)
    }

    /// Look up an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Whether the actor exists.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Ids in spawn order.
    #[must_use]
    pub fn ids(&self) -> &[ActorId] {
        &self.order
    }

    /// Actors in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.order.iter().filter_map(|id| self.actors.get(id))
    }

    /// Apply `f` to every actor in spawn order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Actor)) {
        for id in &self.order {
            if let Some(actor) = self.actors.get_mut(id) {
                f(actor);
            }
        }
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
