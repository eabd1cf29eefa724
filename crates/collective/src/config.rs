//! Configuration loading for a population.
//!
//! Settings are read from a TOML file. Every section is optional; missing
//! values fall back to defaults. Archetype definitions are the exception:
//! each one must list every field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::archetype::{ArchetypeRegistry, ArchetypeSpec};
use crate::backend::BackendKind;
use crate::engine::InteractionRules;
use crate::error::ConfigError;

/// Complete population configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimConfig {
    /// Seed, pacing and backend choice
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Success roll rules
    #[serde(default)]
    pub interaction: InteractionRules,
    /// Extra archetypes, or replacements for built-in presets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archetypes: Vec<ArchetypeSpec>,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Built-in presets plus the archetypes defined here, which replace
    /// presets of the same name.
    pub fn registry(&self) -> Result<ArchetypeRegistry, ConfigError> {
        let mut registry = ArchetypeRegistry::builtin();
        for spec in &self.archetypes {
            registry.register_or_replace(spec.clone())?;
        }
        Ok(registry)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the population RNG
    pub seed: u64,
    /// Interaction rounds per tick used by [`crate::Population::step`]
    pub interactions_per_tick: u32,
    pub backend: BackendKind,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            interactions_per_tick: 1,
            backend: BackendKind::Reference,
        }
    }
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> String {
    r#"# Emotion collective configuration

[simulation]
seed = 42
interactions_per_tick = 1
# "reference" or "dense"
backend = "reference"

[interaction]
base_success_chance = 0.5
# initiator affinity is divided by this
affinity_scale = 20.0
# weight of (0.3 - responder refusal chance)
disposition_weight = 1.0
min_success_chance = 0.1
max_success_chance = 0.9

# Extra archetypes. Every field is required.
#
# [[archetypes]]
# name = "Stoic"
# description = "Barely moved by anything"
# refusal_chance = 0.2
# decay_rate = 0.1
# emotion_decay = 0.3
# temperature = 0.8
# [archetypes.weights]
# joy_sadness = 0.5
# fear_calm = 0.5
# anger_humility = 0.5
# disgust_acceptance = 0.5
# surprise_habit = 0.5
# shame_confidence = 0.5
# openness_alienation = 0.5
# [archetypes.emotion_coefficients]
# joy_sadness = 1.0
# fear_calm = 1.0
# anger_humility = 1.0
# disgust_acceptance = 1.0
# surprise_habit = 1.0
# shame_confidence = 1.0
# openness_alienation = 1.0
# [archetypes.scoring]
# affinity = "linear"
# utility = "log"
# trust = "sigmoid"
# responsiveness = "linear"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::{presets, Transform};
    use crate::error::ArchetypeError;

    #[test]
    fn test_default_config_parses() {
        let config = SimConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = SimConfig::from_str(
            r#"
            [simulation]
            backend = "dense"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.backend, BackendKind::Dense);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.interaction, InteractionRules::default());
    }

    #[test]
    fn test_round_trip_with_archetype() {
        let mut config = SimConfig::default();
        let mut spec = presets::trailblaze();
        spec.name = "Wanderer".to_string();
        spec.scoring.utility = Transform::Periodic;
        config.archetypes.push(spec);

        let text = config.to_toml().unwrap();
        let parsed = SimConfig::from_str(&text).unwrap();
        assert_eq!(parsed, config);

        let registry = parsed.registry().unwrap();
        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.get("Wanderer").unwrap().scoring().utility,
            Transform::Periodic
        );
    }

    #[test]
    fn test_invalid_archetype_rejected() {
        let mut config = SimConfig::default();
        let mut spec = presets::hunt();
        spec.temperature = -1.0;
        config.archetypes.push(spec);

        assert!(matches!(
            config.registry(),
            Err(ConfigError::Archetype(ArchetypeError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_incomplete_archetype_is_parse_error() {
        let result = SimConfig::from_str(
            r#"
            [[archetypes]]
            name = "Half"
            description = "no weights"
            refusal_chance = 0.2
            decay_rate = 0.1
            emotion_decay = 0.1
            temperature = 1.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let result = SimConfig::from_str("[simulation]\nbackend = \"gpu\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
