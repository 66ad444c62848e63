//! # PATHOS Core Library
//!
//! Game-agnostic affective simulation for game characters.
//!
//! Every actor (NPC, creature, companion) gets an [`EmotionCore`] driven by a
//! shared, read-only [`EmotionProfile`]:
//!
//! - **Traits & state** — who the actor is and how it feels right now
//! - **Reaction rules** — how stimuli turn into emotion transitions
//! - **Modifiers** — time-bounded intensity adjustments, optionally slowing decay
//! - **Decay** — the periodic drift back to the actor's baseline
//! - **Emotional memory** — a bounded, fading history plus impressions of others
//! - **Relationships** — pairwise score and familiarity between actors
//! - **Influence** — proximity-based emotional contagion between actors
//!
//! ## Performance Contract
//!
//! All operations are designed for a fixed simulation tick:
//! - Stimulus intake (rule lookup + commit): < 5μs
//! - Decay tick (500 actors): < 100μs
//! - Influence pass (100 actors, O(n²)): < 1ms

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod emotion;
pub mod error;
pub mod events;
pub mod influence;
pub mod memory;
pub mod metrics;
pub mod modifier;
pub mod profile;
pub mod relationship;
pub mod scheduler;
pub mod stimulus;
pub mod types;

pub use config::PathosConfig;
pub use controller::{EmotionCore, StimulusOutcome};
pub use emotion::{Emotion, EmotionClass, EmotionTraits, EmotionalState};
pub use error::PathosError;
pub use influence::InfluenceSystem;
pub use profile::{EmotionProfile, ProfileLibrary, ReactionRule};
pub use stimulus::{EmotionalStimulus, StimulusKind};
pub use types::*;
