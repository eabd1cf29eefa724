//! Agents
//!
//! An agent carries an emotional state, a sensitivity, a shared archetype and
//! its outgoing relations. The daily feedback rules live in
//! [`crate::engine::feedback`]; the methods here apply them to one agent.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::archetype::Archetype;
use crate::emotion::{EmotionAxis, EmotionState};
use crate::engine::feedback::{self, EmotionEffect};
use crate::error::PopulationError;
use crate::relation::RelationVector;

/// Unique identifier for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Description of an agent to be added to a population.
///
/// The archetype is resolved by name when the agent is inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub id: AgentId,
    /// `None` picks the registry's default archetype
    pub archetype: Option<String>,
    pub sensitivity: f64,
    pub emotions: Vec<(EmotionAxis, f64)>,
}

impl AgentSpec {
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            archetype: None,
            sensitivity: 1.0,
            emotions: Vec::new(),
        }
    }

    pub fn archetype(mut self, name: impl Into<String>) -> Self {
        self.archetype = Some(name.into());
        self
    }

    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Initial value for one axis; axes left out start at zero.
    pub fn emotion(mut self, axis: EmotionAxis, value: f64) -> Self {
        self.emotions.push((axis, value));
        self
    }
}

/// A member of a population
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    emotions: EmotionState,
    sensitivity: f64,
    archetype: Arc<Archetype>,
    relations: BTreeMap<AgentId, RelationVector>,
    external_relations: BTreeMap<String, RelationVector>,
}

impl Agent {
    /// Creates an agent with neutral emotions and no relations.
    ///
    /// Sensitivity must be finite and strictly positive.
    pub fn new(
        id: AgentId,
        archetype: Arc<Archetype>,
        sensitivity: f64,
    ) -> Result<Self, PopulationError> {
        if !(sensitivity.is_finite() && sensitivity > 0.0) {
            return Err(PopulationError::InvalidSensitivity {
                id: id.0,
                value: sensitivity,
            });
        }
        Ok(Self {
            id,
            emotions: EmotionState::neutral(),
            sensitivity,
            archetype,
            relations: BTreeMap::new(),
            external_relations: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn emotions(&self) -> &EmotionState {
        &self.emotions
    }

    pub(crate) fn emotions_mut(&mut self) -> &mut EmotionState {
        &mut self.emotions
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn archetype(&self) -> &Arc<Archetype> {
        &self.archetype
    }

    /// Sets an axis directly, bypassing archetype weights.
    pub fn set_emotion(&mut self, axis: EmotionAxis, value: f64) {
        self.emotions.set(axis, value);
    }

    /// Adjusts an axis through the archetype's weights.
    pub fn adjust_emotion(&mut self, axis: EmotionAxis, raw_delta: f64) {
        self.emotions.adjust(axis, raw_delta, self.archetype.weights());
    }

    pub fn primary_emotion<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(EmotionAxis, f64)> {
        self.emotions.primary(rng)
    }

    /// Relation toward `target`; the zero vector when none is stored.
    pub fn relation(&self, target: &AgentId) -> RelationVector {
        self.relations.get(target).copied().unwrap_or_default()
    }

    pub fn has_relation(&self, target: &AgentId) -> bool {
        self.relations.contains_key(target)
    }

    /// Stored outgoing relations, ordered by target id
    pub fn relations(&self) -> impl Iterator<Item = (&AgentId, &RelationVector)> {
        self.relations.iter()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub(crate) fn relation_mut(&mut self, target: &AgentId) -> &mut RelationVector {
        self.relations.entry(target.clone()).or_default()
    }

    pub(crate) fn set_relation(&mut self, target: AgentId, relation: RelationVector) {
        self.relations.insert(target, relation);
    }

    pub(crate) fn remove_relation(&mut self, target: &AgentId) -> Option<RelationVector> {
        self.relations.remove(target)
    }

    /// Stored relations in target id order
    pub(crate) fn relation_values_mut(&mut self) -> impl Iterator<Item = &mut RelationVector> {
        self.relations.values_mut()
    }

    pub(crate) fn replace_relations(&mut self, relations: BTreeMap<AgentId, RelationVector>) {
        self.relations = relations;
    }

    /// Relation toward an actor outside the population
    pub fn external_relation(&self, actor: &str) -> RelationVector {
        self.external_relations
            .get(actor)
            .copied()
            .unwrap_or_default()
    }

    pub fn external_relations(&self) -> impl Iterator<Item = (&str, &RelationVector)> {
        self.external_relations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn external_relation_mut(&mut self, actor: &str) -> &mut RelationVector {
        self.external_relations.entry(actor.to_string()).or_default()
    }

    /// Feeds the mean warmth of all outgoing relations into every emotion
    /// axis. No-op without relations.
    pub fn react_to_relations(&mut self) {
        feedback::relation_to_emotion(
            &mut self.emotions,
            &self.archetype,
            self.sensitivity,
            self.relations.values(),
        );
    }

    /// Pushes strong emotions onto every outgoing relation.
    pub fn react_to_emotions(&mut self) {
        let effect = EmotionEffect::from_emotions(&self.emotions, self.sensitivity);
        if effect.is_zero() {
            return;
        }
        for rel in self.relations.values_mut() {
            effect.apply(rel);
        }
    }

    /// Pulls every outgoing relation toward zero at the archetype's rate.
    pub fn apply_relation_decay(&mut self) {
        let step = self.archetype.decay_rate() * self.sensitivity;
        for rel in self.relations.values_mut() {
            feedback::decay_relation(rel, step);
        }
    }

    /// Pulls every emotion axis toward zero at the archetype's rate.
    pub fn apply_emotion_decay(&mut self) {
        self.emotions
            .decay(self.archetype.emotion_decay() * self.sensitivity);
    }

    /// Changes responsiveness toward `target` by `delta × sensitivity`.
    ///
    /// Positive changes to a negative value are amplified.
    pub fn update_responsiveness(&mut self, target: &AgentId, delta: f64) {
        let sensitivity = self.sensitivity;
        feedback::bump_responsiveness(self.relation_mut(target), delta, sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeRegistry;
    use crate::relation::{RELATION_MAX, RELATION_MIN};

    fn agent(name: &str, archetype: &str) -> Agent {
        let registry = ArchetypeRegistry::builtin();
        Agent::new(AgentId::new(name), registry.get(archetype).unwrap(), 1.0).unwrap()
    }

    #[test]
    fn test_invalid_sensitivity_rejected() {
        let registry = ArchetypeRegistry::builtin();
        let archetype = registry.get("Hunt").unwrap();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Agent::new(AgentId::new("x"), Arc::clone(&archetype), bad).unwrap_err();
            assert!(matches!(err, PopulationError::InvalidSensitivity { .. }));
        }
    }

    #[test]
    fn test_missing_relation_reads_zero() {
        let a = agent("a", "Hunt");
        assert_eq!(a.relation(&AgentId::new("nobody")), RelationVector::ZERO);
        assert!(!a.has_relation(&AgentId::new("nobody")));
    }

    #[test]
    fn test_adjust_uses_archetype_weights() {
        let mut a = agent("a", "Enigmata");
        a.adjust_emotion(EmotionAxis::AngerHumility, -1.0);
        assert!((a.emotions().get(EmotionAxis::AngerHumility) + 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_react_to_emotions_touches_every_edge() {
        let mut a = agent("a", "Trailblaze");
        a.set_relation(AgentId::new("b"), RelationVector::ZERO);
        a.set_relation(AgentId::new("c"), RelationVector::new(0.0, 1.0, 0.0, 0.0));
        a.set_emotion(EmotionAxis::JoySadness, 2.0);

        a.react_to_emotions();
        assert!((a.relation(&AgentId::new("b")).affinity - 0.6).abs() < 1e-12);
        assert!((a.relation(&AgentId::new("c")).affinity - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_relation_decay_converges_without_overshoot() {
        let mut a = agent("a", "Erudition");
        let b = AgentId::new("b");
        a.set_relation(b.clone(), RelationVector::new(RELATION_MAX, RELATION_MIN, 4.0, -7.0));

        let mut previous = a.relation(&b);
        for _ in 0..500 {
            a.apply_relation_decay();
            let current = a.relation(&b);
            assert!(current.utility <= previous.utility && current.utility >= 0.0);
            assert!(current.affinity >= previous.affinity && current.affinity <= 0.0);
            assert!(current.trust <= previous.trust && current.trust >= 0.0);
            assert!(current.responsiveness >= previous.responsiveness && current.responsiveness <= 0.0);
            previous = current;
        }
        assert!(previous.is_zero());
    }

    #[test]
    fn test_emotion_decay_uses_sensitivity() {
        let registry = ArchetypeRegistry::builtin();
        let mut a = Agent::new(AgentId::new("a"), registry.get("Trailblaze").unwrap(), 2.0).unwrap();
        a.set_emotion(EmotionAxis::FearCalm, -1.0);
        a.apply_emotion_decay();
        // 0.2 per tick times sensitivity 2
        assert!((a.emotions().get(EmotionAxis::FearCalm) + 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_update_responsiveness_creates_edge() {
        let mut a = agent("a", "Harmony");
        let b = AgentId::new("b");
        a.update_responsiveness(&b, -1.0);
        assert!(a.has_relation(&b));
        assert_eq!(a.relation(&b).responsiveness, -1.0);

        a.update_responsiveness(&b, 0.5);
        assert!((a.relation(&b).responsiveness - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_agent_spec_builder() {
        let spec = AgentSpec::new("zoe")
            .archetype("Harmony")
            .sensitivity(0.8)
            .emotion(EmotionAxis::JoySadness, 1.0);
        assert_eq!(spec.id, AgentId::new("zoe"));
        assert_eq!(spec.archetype.as_deref(), Some("Harmony"));
        assert_eq!(spec.emotions, vec![(EmotionAxis::JoySadness, 1.0)]);
    }
}
