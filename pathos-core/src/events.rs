//! Change notifications and the observer lists that deliver them.
//!
//! Handlers are plain callbacks invoked synchronously, in registration order.
//! Presentation (color, audio, camera) lives entirely in subscribers; the core
//! only describes what changed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::emotion::Emotion;
use crate::stimulus::EmotionalStimulus;
use crate::types::{ActorId, GameTimestamp};

/// What caused a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeSource {
    /// A reaction rule fired for a stimulus.
    Stimulus,
    /// A delayed reaction rule fired.
    DeferredStimulus,
    /// A direct override.
    Forced,
    /// A modifier was added or expired.
    Modifier,
    /// Periodic decay.
    Decay,
    /// Reset to the profile baseline.
    BaselineReset,
}

/// Fired whenever an actor's visible state changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionChangeEvent {
    /// Actor whose state changed.
    pub actor: ActorId,
    /// Emotion before the change.
    pub old_emotion: Emotion,
    /// Intensity before the change.
    pub old_intensity: f32,
    /// Emotion after the change.
    pub new_emotion: Emotion,
    /// Intensity after the change.
    pub new_intensity: f32,
    /// What caused it.
    pub source: ChangeSource,
    /// The stimulus that triggered it, if any.
    pub stimulus: Option<EmotionalStimulus>,
    /// When it happened.
    pub timestamp: GameTimestamp,
}

impl EmotionChangeEvent {
    /// Actor that originated the triggering stimulus, if any.
    #[must_use]
    pub fn source_actor(&self) -> Option<ActorId> {
        self.stimulus.as_ref().and_then(|s| s.source)
    }

    /// Whether anything visible changed beyond `epsilon`.
    #[must_use]
    pub fn is_change(&self, epsilon: f32) -> bool {
        self.old_emotion != self.new_emotion
            || (self.old_intensity - self.new_intensity).abs() > epsilon
    }
}

/// Fired when a threshold behavior matches a committed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSignal {
    /// Actor whose state matched.
    pub actor: ActorId,
    /// Behavior name.
    pub behavior: String,
    /// Emotion at the time.
    pub emotion: Emotion,
    /// Intensity at the time.
    pub intensity: f32,
    /// When it fired.
    pub timestamp: GameTimestamp,
}

/// Fired when a combo behavior matches a committed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboSignal {
    /// Actor whose state matched.
    pub actor: ActorId,
    /// Behavior name.
    pub behavior: String,
    /// Emotion the combination represents.
    pub resulting: Emotion,
    /// Intensity at the time.
    pub intensity: f32,
    /// When it fired.
    pub timestamp: GameTimestamp,
}

/// Everything an emotion core can report in one step.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// State changed.
    Changed(EmotionChangeEvent),
    /// Threshold behavior fired.
    Threshold(ThresholdSignal),
    /// Combo behavior fired.
    Combo(ComboSignal),
}

// ---------------------------------------------------------------------------
// Observer lists
// ---------------------------------------------------------------------------

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Boxed event handler.
pub type Handler<E> = Box<dyn FnMut(&E)>;

/// Ordered list of callbacks for one event type.
pub struct Observers<E> {
    handlers: Vec<(SubscriptionId, Handler<E>)>,
    next_id: u64,
}

impl<E> Observers<E> {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a handler; it runs after every handler registered before it.
    pub fn subscribe(&mut self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Invoke every handler with `event`.
    pub fn emit(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers: Observers<u32> = Observers::new();

        let first = Rc::clone(&log);
        observers.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = Rc::clone(&log);
        observers.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        observers.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let count = Rc::new(RefCell::new(0));
        let mut observers: Observers<()> = Observers::new();
        let c = Rc::clone(&count);
        let id = observers.subscribe(move |_| *c.borrow_mut() += 1);

        observers.emit(&());
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(&());
        assert_eq!(*count.borrow(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn change_detection_uses_epsilon() {
        let event = EmotionChangeEvent {
            actor: ActorId::new(),
            old_emotion: Emotion::HAPPY,
            old_intensity: 0.5,
            new_emotion: Emotion::HAPPY,
            new_intensity: 0.5005,
            source: ChangeSource::Decay,
            stimulus: None,
            timestamp: GameTimestamp::zero(),
        };
        assert!(!event.is_change(0.001));
        assert!(event.is_change(0.0001));
        assert!(event.source_actor().is_none());
    }
}
