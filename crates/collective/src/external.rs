//! External actors.
//!
//! Participants that live outside the population, such as a human player.
//! The population never writes their state directly; it goes through
//! [`ExternalActor`].

use std::collections::BTreeMap;

use crate::agent::AgentId;
use crate::emotion::{EmotionAxis, EMOTION_MAX, EMOTION_MIN};
use crate::relation::RelationVector;

/// Contract for anything an agent can interact with outside the population
pub trait ExternalActor {
    fn id(&self) -> &str;

    /// Called when `agent` approaches this actor showing its primary emotion.
    fn respond_to_agent(&mut self, agent: &AgentId, axis: EmotionAxis, value: f64);

    /// Emotion this actor currently shows to agents, if any
    fn expressed_emotion(&self) -> Option<(EmotionAxis, f64)>;
}

/// A human-controlled participant with its own view of each agent
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    id: String,
    expressed: Option<(EmotionAxis, f64)>,
    relations: BTreeMap<AgentId, RelationVector>,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expressed: None,
            relations: BTreeMap::new(),
        }
    }

    /// Sets the emotion shown to agents, clamped to the emotion bounds.
    pub fn express(&mut self, axis: EmotionAxis, value: f64) {
        if value.is_nan() {
            return;
        }
        self.expressed = Some((axis, value.clamp(EMOTION_MIN, EMOTION_MAX)));
    }

    pub fn clear_expression(&mut self) {
        self.expressed = None;
    }

    pub fn relation(&self, agent: &AgentId) -> RelationVector {
        self.relations.get(agent).copied().unwrap_or_default()
    }

    pub fn relations(&self) -> impl Iterator<Item = (&AgentId, &RelationVector)> {
        self.relations.iter()
    }
}

impl ExternalActor for Player {
    fn id(&self) -> &str {
        &self.id
    }

    fn respond_to_agent(&mut self, agent: &AgentId, _axis: EmotionAxis, value: f64) {
        let rel = self.relations.entry(agent.clone()).or_default();
        rel.adjust_affinity(value);
        rel.adjust_trust(value);
        rel.adjust_utility(value);
    }

    fn expressed_emotion(&self) -> Option<(EmotionAxis, f64)> {
        self.expressed
    }
}
