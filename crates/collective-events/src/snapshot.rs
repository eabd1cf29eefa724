//! Snapshot Types
//!
//! Serialization structs capturing emotions and relations at a point in time.
//! The engine produces them; persistence and display layers read them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One directed relation as seen from its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSnapshot {
    pub target: String,
    pub utility: f64,
    pub affinity: f64,
    pub trust: f64,
    pub responsiveness: f64,
}

/// Agent state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub archetype: String,
    pub sensitivity: f64,
    /// Axis name -> value in [-3, 3]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub relations: Vec<RelationSnapshot>,
    /// Relations toward actors outside the population
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_relations: Vec<RelationSnapshot>,
}

impl AgentSnapshot {
    pub fn relation(&self, target: &str) -> Option<&RelationSnapshot> {
        self.relations.iter().find(|r| r.target == target)
    }

    pub fn emotion(&self, axis: &str) -> Option<f64> {
        self.emotions.get(axis).copied()
    }
}

/// Complete population state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Number of completed ticks
    pub tick: u64,
    /// Execution backend that produced the state
    pub backend: String,
    pub agents: Vec<AgentSnapshot>,
}

impl PopulationSnapshot {
    pub fn agent(&self, id: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Directed relation lookup; `None` when no edge was recorded.
    pub fn relation(&self, from: &str, to: &str) -> Option<&RelationSnapshot> {
        self.agent(from).and_then(|a| a.relation(to))
    }

    pub fn edge_count(&self) -> usize {
        self.agents.iter().map(|a| a.relations.len()).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PopulationSnapshot {
        let mut emotions = BTreeMap::new();
        emotions.insert("joy_sadness".to_string(), 1.5);
        PopulationSnapshot {
            tick: 4,
            backend: "reference".to_string(),
            agents: vec![AgentSnapshot {
                id: "alice".to_string(),
                archetype: "Harmony".to_string(),
                sensitivity: 1.0,
                emotions,
                relations: vec![RelationSnapshot {
                    target: "bob".to_string(),
                    utility: 2.0,
                    affinity: -1.0,
                    trust: 1.0,
                    responsiveness: 0.0,
                }],
                external_relations: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_relation_lookup() {
        let snapshot = sample();
        let rel = snapshot.relation("alice", "bob").unwrap();
        assert_eq!(rel.utility, 2.0);
        assert!(snapshot.relation("bob", "alice").is_none());
        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.agent("alice").unwrap().emotion("joy_sadness"), Some(1.5));
    }

    #[test]
    fn test_empty_external_relations_are_omitted() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("external_relations"));

        let parsed: PopulationSnapshot = serde_json::from_str(&json).unwrap();
        assert!(parsed.agents[0].external_relations.is_empty());
    }
}
