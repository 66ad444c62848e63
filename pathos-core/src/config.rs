//! Configuration for the PATHOS emotion system.
//!
//! Maps directly to `pathos.toml`. Every section and field has a default, so
//! an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{PathosError, Result};
use crate::types::LayerMask;

/// Top-level PATHOS configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathosConfig {
    /// Fixed-step simulation settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Emotional memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Emotional influence (contagion) settings.
    #[serde(default)]
    pub influence: InfluenceConfig,
    /// Relationship store settings.
    #[serde(default)]
    pub social: SocialConfig,
    /// Step budget monitoring.
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl PathosConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PathosError::Config` if the TOML is invalid or a value is out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| PathosError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// # Errors
    /// Returns `PathosError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.simulation.tick_interval <= 0.0 {
            return Err(PathosError::Config(
                "simulation.tick_interval must be positive".to_string(),
            ));
        }
        if self.influence.interval <= 0.0 {
            return Err(PathosError::Config(
                "influence.interval must be positive".to_string(),
            ));
        }
        if self.influence.base_radius < 0.0 {
            return Err(PathosError::Config(
                "influence.base_radius must not be negative".to_string(),
            ));
        }
        if self.memory.capacity == 0 {
            return Err(PathosError::Config(
                "memory.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Fixed-step decay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seconds of simulated time per decay tick.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: f32,
    /// Decay multiplier while decay is suspended or blocked by a modifier.
    #[serde(default = "default_0_2")]
    pub suspended_decay_factor: f32,
    /// Intensity at or below which a non-dominant emotion resets to baseline.
    #[serde(default = "default_0_01")]
    pub reset_threshold: f32,
    /// Intensity difference below which two states count as equal.
    #[serde(default = "default_epsilon")]
    pub change_epsilon: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: 0.2,
            suspended_decay_factor: 0.2,
            reset_threshold: 0.01,
            change_epsilon: 0.001,
        }
    }
}

/// Per-actor emotional memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum records per actor; the oldest is evicted beyond this.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Potency at or below which a record is forgotten.
    #[serde(default = "default_0_05")]
    pub forgetting_threshold: f32,
    /// Changes weaker than this are not remembered.
    #[serde(default = "default_0_1")]
    pub min_record_intensity: f32,
    /// Impression shift per remembered event, scaled by intensity.
    #[serde(default = "default_0_2")]
    pub impression_weight: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            forgetting_threshold: 0.05,
            min_record_intensity: 0.1,
            impression_weight: 0.2,
        }
    }
}

/// Emotional influence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluenceConfig {
    /// Whether the influence pass runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between influence passes.
    #[serde(default = "default_influence_interval")]
    pub interval: f32,
    /// Radius reached by a source at full intensity.
    #[serde(default = "default_base_radius")]
    pub base_radius: f32,
    /// Sources weaker than this do not radiate.
    #[serde(default = "default_0_3")]
    pub min_source_intensity: f32,
    /// Multiplier on every transmitted intensity.
    #[serde(default = "default_falloff")]
    pub intensity_falloff: f32,
    /// Layers targets must be on.
    #[serde(default)]
    pub layer_mask: LayerMask,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 1.5,
            base_radius: 12.0,
            min_source_intensity: 0.3,
            intensity_falloff: 0.6,
            layer_mask: LayerMask::default(),
        }
    }
}

/// Relationship store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Whether relationships modulate influence.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Familiarity gained per unit of transmitted intensity.
    #[serde(default = "default_0_05")]
    pub growth_rate: f32,
    /// Multiplier applied to every influence modifier.
    #[serde(default = "default_1_0")]
    pub base_multiplier: f32,
    /// Familiarity of a freshly created relationship.
    #[serde(default = "default_0_1")]
    pub initial_familiarity: f32,
    /// Score shift for positive emotions, per unit intensity.
    #[serde(default = "default_0_1")]
    pub positive_delta: f32,
    /// Score shift for negative emotions, per unit intensity.
    #[serde(default = "default_negative_delta")]
    pub negative_delta: f32,
    /// Score shift for melancholy emotions, per unit intensity.
    #[serde(default = "default_0_05")]
    pub melancholy_delta: f32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            growth_rate: 0.05,
            base_multiplier: 1.0,
            initial_familiarity: 0.1,
            positive_delta: 0.1,
            negative_delta: -0.15,
            melancholy_delta: 0.05,
        }
    }
}

/// Step budget monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Wall-clock milliseconds one `step` may take before it is logged as slow.
    #[serde(default = "default_step_budget")]
    pub step_budget_ms: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { step_budget_ms: 2.0 }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_tick_interval() -> f32 { 0.2 }
fn default_influence_interval() -> f32 { 1.5 }
fn default_base_radius() -> f32 { 12.0 }
fn default_falloff() -> f32 { 0.6 }
fn default_negative_delta() -> f32 { -0.15 }
fn default_epsilon() -> f32 { 0.001 }
fn default_0_01() -> f32 { 0.01 }
fn default_0_05() -> f32 { 0.05 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_2() -> f32 { 0.2 }
fn default_0_3() -> f32 { 0.3 }
fn default_1_0() -> f32 { 1.0 }
fn default_capacity() -> usize { 32 }
fn default_step_budget() -> f64 { 2.0 }
