//! Error types for the PATHOS core library.
//!
//! Nothing on the simulation path is fatal: unmatched stimuli, missing
//! actors and destroyed targets are silent no-ops. Errors only surface from
//! configuration loading and explicit lookups.

use thiserror::Error;

/// Top-level error type for all PATHOS operations.
#[derive(Error, Debug)]
pub enum PathosError {
    /// Configuration could not be parsed or holds invalid values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named emotion profile is not present in the library.
    #[error("Emotion profile not found: {0}")]
    ProfileNotFound(String),

    /// Actor not found in the simulation.
    #[error("Actor not found: {0}")]
    ActorNotFound(crate::ActorId),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PathosError>;
