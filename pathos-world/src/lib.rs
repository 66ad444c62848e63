//! # pathos-world — Scene Integration for PATHOS
//!
//! This crate provides the integration layer between the game-agnostic
//! `pathos-core` library and a host game's update loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Host game loop                │
//! │  ┌───────────────────────────────────┐  │
//! │  │       pathos-world                │  │
//! │  │  ┌─────────────┐ ┌─────────────┐ │  │
//! │  │  │ Components  │ │   Systems   │ │  │
//! │  │  └──────┬──────┘ └──────┬──────┘ │  │
//! │  │         │               │         │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      EmotionWorld       │    │  │
//! │  │    └────────────┬────────────┘    │  │
//! │  │                 ▼                 │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      pathos-core        │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components` — per-actor data (emotion core, location, layer) and the actor table
//! - `systems` — decay, influence snapshot and event-to-stimulus translation
//! - `events` — game event types that trigger emotional reactions
//! - `hooks` — constructors the host's dialogue, combat and ability code calls
//! - `world` — [`EmotionWorld`], the step driver that owns a scene

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod components;
pub mod events;
pub mod hooks;
pub mod systems;
pub mod world;

pub use events::GameEvent;
pub use world::{EmotionWorld, StepReport};
