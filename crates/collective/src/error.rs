//! Error types for the collective engine.
//!
//! Clamping numeric input is normal operation and never produces an error;
//! everything here is a caller input mistake.

use thiserror::Error;

/// Errors raised by archetype construction and lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArchetypeError {
    /// No archetype is registered under this name
    #[error("unknown archetype '{0}'")]
    Unknown(String),
    /// A field failed validation
    #[error("archetype '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
    /// The registry already holds an archetype with this name
    #[error("archetype '{0}' is already registered")]
    Duplicate(String),
}

/// Errors raised by population operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PopulationError {
    /// The operation named an agent that is not in the population
    #[error("no agent with id '{0}'")]
    InvalidAgentReference(String),
    /// An agent with this id already exists
    #[error("agent '{0}' already exists")]
    DuplicateAgent(String),
    /// Relations from an agent to itself are not stored
    #[error("agent '{0}' cannot hold a relation to itself")]
    SelfRelation(String),
    /// Sensitivity must be finite and strictly positive
    #[error("agent '{id}' has invalid sensitivity {value}")]
    InvalidSensitivity { id: String, value: f64 },
    #[error(transparent)]
    Archetype(#[from] ArchetypeError),
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Error serializing config to TOML
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// An archetype definition in the config was rejected
    #[error(transparent)]
    Archetype(#[from] ArchetypeError),
}
