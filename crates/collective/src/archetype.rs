//! Archetypes
//!
//! Immutable personality presets and the read-only registry agents resolve
//! them from.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::emotion::{AxisValues, EmotionAxis};
use crate::error::ArchetypeError;

/// Name of the archetype used when a caller does not pick one
pub const DEFAULT_ARCHETYPE: &str = "Erudition";

/// Nonlinear transform applied to one relation dimension before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    #[default]
    Linear,
    /// `sign(x) * ln(|x| + 1)`
    Log,
    /// `e^(x / 5)`
    Exp,
    /// `10 / (1 + e^-x)`
    Sigmoid,
    /// `5 * sin(x)`
    Periodic,
}

impl Transform {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Transform::Linear => x,
            Transform::Log => x.signum() * (x.abs() + 1.0).ln(),
            Transform::Exp => (x / 5.0).exp(),
            Transform::Sigmoid => 10.0 / (1.0 + (-x).exp()),
            Transform::Periodic => x.sin() * 5.0,
        }
    }
}

/// Per-dimension transform choice for priority scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoringConfig {
    pub affinity: Transform,
    pub utility: Transform,
    pub trust: Transform,
    pub responsiveness: Transform,
}

impl ScoringConfig {
    pub const fn new(
        affinity: Transform,
        utility: Transform,
        trust: Transform,
        responsiveness: Transform,
    ) -> Self {
        Self {
            affinity,
            utility,
            trust,
            responsiveness,
        }
    }

    pub const fn uniform(transform: Transform) -> Self {
        Self::new(transform, transform, transform, transform)
    }
}

/// Unvalidated archetype definition as it appears in configuration.
///
/// Every field is required; convert with [`Archetype::try_from`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeSpec {
    pub name: String,
    pub description: String,
    /// Multiplier on every emotion adjustment, per axis
    pub weights: AxisValues,
    /// How strongly relation warmth feeds each emotion axis
    pub emotion_coefficients: AxisValues,
    /// Base refusal chance in [0, 1]
    pub refusal_chance: f64,
    /// Relation decay per tick, before sensitivity
    pub decay_rate: f64,
    /// Emotion decay per tick, before sensitivity
    pub emotion_decay: f64,
    /// Softmax temperature for target selection
    pub temperature: f64,
    pub scoring: ScoringConfig,
}

/// Validated, immutable archetype. Agents share it through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Archetype {
    name: String,
    description: String,
    weights: AxisValues,
    emotion_coefficients: AxisValues,
    refusal_chance: f64,
    decay_rate: f64,
    emotion_decay: f64,
    temperature: f64,
    scoring: ScoringConfig,
}

impl Archetype {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn weights(&self) -> &AxisValues {
        &self.weights
    }

    pub fn emotion_coefficients(&self) -> &AxisValues {
        &self.emotion_coefficients
    }

    pub fn refusal_chance(&self) -> f64 {
        self.refusal_chance
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn emotion_decay(&self) -> f64 {
        self.emotion_decay
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Back to an editable definition, e.g. for writing a config file.
    pub fn to_spec(&self) -> ArchetypeSpec {
        ArchetypeSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            weights: self.weights,
            emotion_coefficients: self.emotion_coefficients,
            refusal_chance: self.refusal_chance,
            decay_rate: self.decay_rate,
            emotion_decay: self.emotion_decay,
            temperature: self.temperature,
            scoring: self.scoring,
        }
    }
}

impl TryFrom<ArchetypeSpec> for Archetype {
    type Error = ArchetypeError;

    fn try_from(spec: ArchetypeSpec) -> Result<Self, Self::Error> {
        let invalid = |reason: String| ArchetypeError::Invalid {
            name: spec.name.clone(),
            reason,
        };

        if spec.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        for (axis, weight) in spec.weights.iter() {
            if !weight.is_finite() {
                return Err(invalid(format!("weight for {} is not finite", axis)));
            }
        }
        for (axis, coefficient) in spec.emotion_coefficients.iter() {
            if !coefficient.is_finite() {
                return Err(invalid(format!("coefficient for {} is not finite", axis)));
            }
        }
        if !(0.0..=1.0).contains(&spec.refusal_chance) {
            return Err(invalid(format!(
                "refusal_chance {} outside [0, 1]",
                spec.refusal_chance
            )));
        }
        if !(spec.decay_rate.is_finite() && spec.decay_rate > 0.0) {
            return Err(invalid(format!(
                "decay_rate {} must be positive",
                spec.decay_rate
            )));
        }
        if !(spec.emotion_decay.is_finite() && spec.emotion_decay >= 0.0) {
            return Err(invalid(format!(
                "emotion_decay {} must be non-negative",
                spec.emotion_decay
            )));
        }
        if !(spec.temperature.is_finite() && spec.temperature > 0.0) {
            return Err(invalid(format!(
                "temperature {} must be positive",
                spec.temperature
            )));
        }

        Ok(Archetype {
            name: spec.name,
            description: spec.description,
            weights: spec.weights,
            emotion_coefficients: spec.emotion_coefficients,
            refusal_chance: spec.refusal_chance,
            decay_rate: spec.decay_rate,
            emotion_decay: spec.emotion_decay,
            temperature: spec.temperature,
            scoring: spec.scoring,
        })
    }
}

/// Read-only lookup of archetypes by name
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, Arc<Archetype>>,
}

impl ArchetypeRegistry {
    /// Registry with no archetypes at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the nine built-in presets
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for spec in presets::all() {
            let name = spec.name.clone();
            match Archetype::try_from(spec) {
                Ok(archetype) => {
                    registry.archetypes.insert(name, Arc::new(archetype));
                }
                Err(e) => tracing::error!("Built-in archetype rejected: {}", e),
            }
        }
        registry
    }

    pub fn get(&self, name: &str) -> Result<Arc<Archetype>, ArchetypeError> {
        self.archetypes
            .get(name)
            .cloned()
            .ok_or_else(|| ArchetypeError::Unknown(name.to_string()))
    }

    /// The archetype named [`DEFAULT_ARCHETYPE`]
    pub fn default_archetype(&self) -> Result<Arc<Archetype>, ArchetypeError> {
        self.get(DEFAULT_ARCHETYPE)
    }

    /// Adds a new archetype. Fails if the name is taken.
    pub fn register(&mut self, spec: ArchetypeSpec) -> Result<Arc<Archetype>, ArchetypeError> {
        if self.archetypes.contains_key(&spec.name) {
            return Err(ArchetypeError::Duplicate(spec.name));
        }
        self.register_or_replace(spec)
    }

    /// Adds an archetype, replacing any existing one with the same name.
    ///
    /// Agents already holding the old archetype keep it.
    pub fn register_or_replace(
        &mut self,
        spec: ArchetypeSpec,
    ) -> Result<Arc<Archetype>, ArchetypeError> {
        let archetype = Arc::new(Archetype::try_from(spec)?);
        self.archetypes
            .insert(archetype.name().to_string(), Arc::clone(&archetype));
        Ok(archetype)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archetypes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

/// Built-in presets.
///
/// Weights are listed in [`EmotionAxis::ALL`] order: joy, fear, anger,
/// disgust, surprise, shame, openness.
pub mod presets {
    use super::*;
    use Transform::*;

    #[allow(clippy::too_many_arguments)]
    fn preset(
        name: &str,
        description: &str,
        weights: [f64; EmotionAxis::COUNT],
        emotion_coefficients: [f64; EmotionAxis::COUNT],
        refusal_chance: f64,
        decay_rate: f64,
        emotion_decay: f64,
        temperature: f64,
        scoring: ScoringConfig,
    ) -> ArchetypeSpec {
        ArchetypeSpec {
            name: name.to_string(),
            description: description.to_string(),
            weights: AxisValues::from_array(weights),
            emotion_coefficients: AxisValues::from_array(emotion_coefficients),
            refusal_chance,
            decay_rate,
            emotion_decay,
            temperature,
            scoring,
        }
    }

    pub fn erudition() -> ArchetypeSpec {
        preset(
            "Erudition",
            "Sage: cool-headed, avoids extremes, values knowledge",
            [0.9, 1.4, 0.6, 1.2, 0.8, 0.7, 1.0],
            [0.8, 1.0, 0.6, 0.9, 0.7, 0.8, 1.0],
            0.2,
            0.1,
            0.2,
            0.8,
            ScoringConfig::new(Linear, Log, Sigmoid, Linear),
        )
    }

    pub fn enigmata() -> ArchetypeSpec {
        preset(
            "Enigmata",
            "Rebel: impulsive, drawn to conflict, seeks change",
            [1.2, 0.6, 1.8, 1.4, 1.2, 0.6, 1.0],
            [0.6, 0.4, 0.8, 0.7, 1.2, 0.5, 0.6],
            0.7,
            0.2,
            0.3,
            2.0,
            ScoringConfig::new(Periodic, Periodic, Linear, Exp),
        )
    }

    pub fn harmony() -> ArchetypeSpec {
        preset(
            "Harmony",
            "Harmonist: seeks balance, maintains relationships, avoids conflict",
            [1.1, 1.2, 0.5, 1.4, 0.9, 1.1, 1.5],
            [1.3, 1.2, 1.0, 1.4, 0.9, 1.1, 1.5],
            0.1,
            0.05,
            0.15,
            0.5,
            ScoringConfig::new(Sigmoid, Linear, Linear, Linear),
        )
    }

    pub fn hunt() -> ArchetypeSpec {
        preset(
            "Hunt",
            "Warrior: bold and decisive, little touched by fear or disgust",
            [1.0, 0.7, 1.6, 0.8, 1.0, 1.3, 0.8],
            [0.9, 0.7, 1.2, 0.6, 0.8, 1.1, 0.7],
            0.3,
            0.12,
            0.2,
            0.6,
            ScoringConfig::new(Log, Exp, Linear, Linear),
        )
    }

    pub fn elation() -> ArchetypeSpec {
        preset(
            "Elation",
            "Trickster: unpredictable, jumps between emotions, loves to surprise",
            [1.5, 0.9, 0.9, 1.1, 1.8, 0.8, 1.2],
            [1.5, 0.8, 0.9, 1.0, 1.4, 0.9, 1.2],
            0.5,
            0.15,
            0.3,
            3.0,
            ScoringConfig::new(Exp, Linear, Log, Periodic),
        )
    }

    pub fn preservation() -> ArchetypeSpec {
        preset(
            "Preservation",
            "Guardian: cares for others, wants stability, strong sense of duty",
            [0.9, 1.0, 0.7, 1.3, 0.8, 1.4, 1.6],
            [0.9, 1.2, 0.8, 1.0, 0.6, 1.0, 1.1],
            0.15,
            0.08,
            0.1,
            0.7,
            ScoringConfig::new(Linear, Linear, Sigmoid, Log),
        )
    }

    pub fn nihility() -> ArchetypeSpec {
        preset(
            "Nihility",
            "Mystery: fixed on decay and doubt, influences through undoing",
            [0.5, 1.3, 1.0, 1.5, 1.1, 0.6, 0.7],
            [0.4, 0.6, 0.5, 0.7, 0.8, 0.4, 0.5],
            0.6,
            0.18,
            0.25,
            1.5,
            ScoringConfig::new(Log, Log, Log, Periodic),
        )
    }

    pub fn trailblaze() -> ArchetypeSpec {
        preset(
            "Trailblaze",
            "Pathfinder: balanced, looks for meaning, open to new paths",
            [1.0; EmotionAxis::COUNT],
            [1.0; EmotionAxis::COUNT],
            0.25,
            0.1,
            0.2,
            1.0,
            ScoringConfig::uniform(Linear),
        )
    }

    pub fn remembrance() -> ArchetypeSpec {
        preset(
            "Remembrance",
            "Memory: values the past, resists emotional swings, reflective",
            [0.8, 1.1, 0.6, 1.2, 0.9, 1.5, 1.3],
            [1.0, 0.9, 0.7, 1.1, 0.6, 1.2, 1.0],
            0.2,
            0.06,
            0.1,
            0.6,
            ScoringConfig::new(Linear, Log, Sigmoid, Linear),
        )
    }

    pub fn all() -> Vec<ArchetypeSpec> {
        vec![
            erudition(),
            enigmata(),
            harmony(),
            hunt(),
            elation(),
            preservation(),
            nihility(),
            trailblaze(),
            remembrance(),
        ]
    }
}
