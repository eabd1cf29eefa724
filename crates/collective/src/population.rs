//! Population
//!
//! Owns every agent and the relation graph, and drives the daily cycle
//! through the selected execution backend.

use std::collections::BTreeSet;

use collective_events::{
    AgentSnapshot, InteractionRecord, PopulationSnapshot, RelationSnapshot, TickSummary,
};
use rand::Rng;

use crate::agent::{Agent, AgentId, AgentSpec};
use crate::archetype::{ArchetypeRegistry, ArchetypeSpec};
use crate::backend::{slot_of, BackendKind, EngineBackend, TickContext};
use crate::config::SimConfig;
use crate::emotion::{EmotionAxis, EmotionState};
use crate::engine::selection::{categorize, Categories};
use crate::engine::{process_external_contact, InteractionRules};
use crate::error::{ArchetypeError, ConfigError, PopulationError};
use crate::external::ExternalActor;
use crate::relation::{RelationVector, RELATION_MAX};
use crate::rng::SimRng;

/// A population of agents and the relations between them
#[derive(Debug)]
pub struct Population {
    registry: ArchetypeRegistry,
    /// Sorted by id; slot order is the processing order of every phase
    agents: Vec<Agent>,
    rng: SimRng,
    tick: u64,
    backend: Box<dyn EngineBackend>,
    rules: InteractionRules,
    interactions_per_tick: u32,
}

impl Population {
    /// Empty population with the built-in archetypes on the reference
    /// backend.
    pub fn new(seed: u64) -> Self {
        Self::with_backend(seed, BackendKind::Reference)
    }

    pub fn with_backend(seed: u64, backend: BackendKind) -> Self {
        Self::with_registry(seed, backend, ArchetypeRegistry::builtin())
    }

    pub fn with_registry(seed: u64, backend: BackendKind, registry: ArchetypeRegistry) -> Self {
        tracing::info!(
            "Creating population: seed {}, backend {}, {} archetypes",
            seed,
            backend,
            registry.len()
        );
        Self {
            registry,
            agents: Vec::new(),
            rng: SimRng::new(seed),
            tick: 0,
            backend: backend.build(),
            rules: InteractionRules::default(),
            interactions_per_tick: 1,
        }
    }

    pub fn from_config(config: &SimConfig) -> Result<Self, ConfigError> {
        let registry = config.registry()?;
        let mut population = Self::with_registry(
            config.simulation.seed,
            config.simulation.backend,
            registry,
        );
        population.rules = config.interaction.clone();
        population.interactions_per_tick = config.simulation.interactions_per_tick;
        Ok(population)
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn rules(&self) -> &InteractionRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: InteractionRules) {
        self.rules = rules;
    }

    pub fn interactions_per_tick(&self) -> u32 {
        self.interactions_per_tick
    }

    pub fn registry(&self) -> &ArchetypeRegistry {
        &self.registry
    }

    /// Adds an archetype for agents created from now on.
    pub fn register_archetype(&mut self, spec: ArchetypeSpec) -> Result<(), ArchetypeError> {
        self.registry.register(spec).map(|_| ())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.slot(id).is_some()
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.slot(id).map(|i| &self.agents[i])
    }

    /// Agents in id order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.iter().map(Agent::id)
    }

    fn slot(&self, id: &AgentId) -> Option<usize> {
        slot_of(&self.agents, id)
    }

    fn require_slot(&self, id: &AgentId) -> Result<usize, PopulationError> {
        self.slot(id)
            .ok_or_else(|| PopulationError::InvalidAgentReference(id.0.clone()))
    }

    /// Adds an agent with the named archetype. Axes missing from
    /// `initial_emotions` start at zero.
    pub fn add_agent(
        &mut self,
        id: impl Into<AgentId>,
        archetype: &str,
        sensitivity: f64,
        initial_emotions: &[(EmotionAxis, f64)],
    ) -> Result<AgentId, PopulationError> {
        self.add_agent_spec(AgentSpec {
            id: id.into(),
            archetype: Some(archetype.to_string()),
            sensitivity,
            emotions: initial_emotions.to_vec(),
        })
    }

    /// Adds an agent from a spec; no archetype means the registry default.
    pub fn add_agent_spec(&mut self, spec: AgentSpec) -> Result<AgentId, PopulationError> {
        let insert_at = match self.agents.binary_search_by(|a| a.id().cmp(&spec.id)) {
            Ok(_) => return Err(PopulationError::DuplicateAgent(spec.id.0)),
            Err(position) => position,
        };

        let archetype = match &spec.archetype {
            Some(name) => self.registry.get(name)?,
            None => self.registry.default_archetype()?,
        };
        let mut agent = Agent::new(spec.id, archetype, spec.sensitivity)?;
        for (axis, value) in spec.emotions {
            agent.set_emotion(axis, value);
        }

        let id = agent.id().clone();
        tracing::info!(
            "Added agent {} ({}, sensitivity {})",
            id,
            agent.archetype().name(),
            agent.sensitivity()
        );
        self.agents.insert(insert_at, agent);
        self.backend.membership_changed();
        Ok(id)
    }

    /// Adds an agent and seeds relations both ways with every existing
    /// agent. Utility, affinity and trust are drawn uniformly from
    /// `[-spread, spread]`; responsiveness starts at zero.
    pub fn introduce_agent(
        &mut self,
        spec: AgentSpec,
        spread: f64,
    ) -> Result<AgentId, PopulationError> {
        let spread = if spread.is_finite() {
            spread.abs().min(RELATION_MAX)
        } else {
            0.0
        };
        let id = self.add_agent_spec(spec)?;

        let others: Vec<AgentId> = self
            .agents
            .iter()
            .map(|a| a.id().clone())
            .filter(|other| *other != id)
            .collect();
        for other in others {
            let outgoing = random_relation(&mut self.rng, spread);
            let incoming = random_relation(&mut self.rng, spread);
            self.set_relation(&id, &other, outgoing)?;
            self.set_relation(&other, &id, incoming)?;
        }
        Ok(id)
    }

    /// Removes an agent and every relation pointing at it.
    pub fn remove_agent(&mut self, id: &AgentId) -> Result<Agent, PopulationError> {
        let slot = self.require_slot(id)?;
        let removed = self.agents.remove(slot);
        self.backend.membership_changed();
        let mut dropped = 0usize;
        for agent in &mut self.agents {
            if agent.remove_relation(id).is_some() {
                dropped += 1;
            }
        }
        tracing::info!("Removed agent {} and {} incoming relations", id, dropped);
        Ok(removed)
    }

    /// Directed relation; the zero vector when absent or when either agent
    /// is unknown.
    pub fn relation(&self, from: &AgentId, to: &AgentId) -> RelationVector {
        self.agent(from)
            .map(|agent| agent.relation(to))
            .unwrap_or_default()
    }

    /// Stores a relation, clamping every component.
    pub fn set_relation(
        &mut self,
        from: &AgentId,
        to: &AgentId,
        relation: RelationVector,
    ) -> Result<(), PopulationError> {
        let slot = self.require_slot(from)?;
        let target = self.require_slot(to)?;
        if from == to {
            return Err(PopulationError::SelfRelation(from.0.clone()));
        }
        let clamped = RelationVector::new(
            relation.utility,
            relation.affinity,
            relation.trust,
            relation.responsiveness,
        );
        self.agents[slot].set_relation(to.clone(), clamped);
        self.backend.relation_set(slot, target, clamped);
        Ok(())
    }

    pub fn emotion_state(&self, id: &AgentId) -> Result<EmotionState, PopulationError> {
        let slot = self.require_slot(id)?;
        Ok(*self.agents[slot].emotions())
    }

    /// Sets one axis directly, clamped and unweighted.
    pub fn set_emotion(
        &mut self,
        id: &AgentId,
        axis: EmotionAxis,
        value: f64,
    ) -> Result<(), PopulationError> {
        let slot = self.require_slot(id)?;
        self.agents[slot].set_emotion(axis, value);
        Ok(())
    }

    /// Splits every other agent by how `id` classifies them.
    pub fn categorize(&self, id: &AgentId) -> Result<Categories<AgentId>, PopulationError> {
        let slot = self.require_slot(id)?;
        let agent = &self.agents[slot];
        Ok(categorize(
            self.agents
                .iter()
                .filter(|other| other.id() != id)
                .map(|other| (other.id().clone(), agent.relation(other.id()))),
        ))
    }

    /// Runs one tick over every agent.
    pub fn run_tick(&mut self, interactions_per_tick: u32) -> Vec<InteractionRecord> {
        let active = vec![true; self.agents.len()];
        self.execute_tick(&active, interactions_per_tick)
    }

    /// Runs one tick with the configured number of interaction rounds.
    pub fn step(&mut self) -> Vec<InteractionRecord> {
        self.run_tick(self.interactions_per_tick)
    }

    /// Runs one tick over `active_ids` only. Other agents are untouched and
    /// cannot be chosen as partners or reached by contagion.
    pub fn run_tick_for_subset(
        &mut self,
        active_ids: &[AgentId],
        interactions_per_tick: u32,
    ) -> Result<Vec<InteractionRecord>, PopulationError> {
        let mut active = vec![false; self.agents.len()];
        let unique: BTreeSet<&AgentId> = active_ids.iter().collect();
        for id in unique {
            active[self.require_slot(id)?] = true;
        }
        Ok(self.execute_tick(&active, interactions_per_tick))
    }

    fn execute_tick(&mut self, active: &[bool], interactions_per_tick: u32) -> Vec<InteractionRecord> {
        let span = tracing::debug_span!("tick", tick = self.tick, backend = %self.backend.kind());
        let _enter = span.enter();

        let seed = self.rng.next_tick_seed();
        let records = self.backend.run_tick(TickContext {
            tick: self.tick,
            seed,
            agents: &mut self.agents,
            active,
            interactions_per_tick,
            rules: &self.rules,
        });

        let summary = TickSummary::from_records(&records);
        tracing::debug!(
            "Tick {} done: {} success, {} fail, {} refused, {} abstained",
            self.tick,
            summary.success,
            summary.fail,
            summary.refusal - summary.abstained,
            summary.abstained
        );
        self.tick += 1;
        records
    }

    /// Lets an agent approach an external actor.
    ///
    /// The agent shows its primary emotion through the actor's contract and
    /// moves its own view of the actor by that emotion. Returns the emotion
    /// shown, or `None` for an agent with neutral emotions, which changes
    /// nothing.
    pub fn interact_with_external(
        &mut self,
        id: &AgentId,
        actor: &mut dyn ExternalActor,
    ) -> Result<Option<(EmotionAxis, f64)>, PopulationError> {
        let slot = self.require_slot(id)?;
        let agent = &mut self.agents[slot];
        let Some((axis, value)) = agent.primary_emotion(&mut self.rng) else {
            return Ok(None);
        };

        actor.respond_to_agent(agent.id(), axis, value);
        let sensitivity = agent.sensitivity();
        process_external_contact(agent.external_relation_mut(actor.id()), value, sensitivity);
        tracing::debug!("Agent {} showed {} {:.2} to {}", id, axis, value, actor.id());
        Ok(Some((axis, value)))
    }

    /// Lets an external actor push its expressed emotion onto an agent.
    ///
    /// The agent's emotion moves through its archetype weights and its view
    /// of the actor shifts by the expressed value. Returns `false` when the
    /// actor expresses nothing.
    pub fn receive_from_external(
        &mut self,
        id: &AgentId,
        actor: &dyn ExternalActor,
    ) -> Result<bool, PopulationError> {
        let slot = self.require_slot(id)?;
        let Some((axis, value)) = actor.expressed_emotion() else {
            return Ok(false);
        };

        let agent = &mut self.agents[slot];
        agent.adjust_emotion(axis, value);
        process_external_contact(agent.external_relation_mut(actor.id()), value, 1.0);
        Ok(true)
    }

    /// Serializable view of every agent, for logging and display.
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            tick: self.tick,
            backend: self.backend.kind().to_string(),
            agents: self.agents.iter().map(agent_snapshot).collect(),
        }
    }
}

fn random_relation(rng: &mut SimRng, spread: f64) -> RelationVector {
    let mut draw = || {
        if spread > 0.0 {
            rng.gen_range(-spread..=spread)
        } else {
            0.0
        }
    };
    let utility = draw();
    let affinity = draw();
    let trust = draw();
    RelationVector::new(utility, affinity, trust, 0.0)
}

fn relation_snapshot(target: &str, rel: &RelationVector) -> RelationSnapshot {
    RelationSnapshot {
        target: target.to_string(),
        utility: rel.utility,
        affinity: rel.affinity,
        trust: rel.trust,
        responsiveness: rel.responsiveness,
    }
}

fn agent_snapshot(agent: &Agent) -> AgentSnapshot {
    AgentSnapshot {
        id: agent.id().0.clone(),
        archetype: agent.archetype().name().to_string(),
        sensitivity: agent.sensitivity(),
        emotions: agent
            .emotions()
            .values()
            .iter()
            .map(|(axis, value)| (axis.as_str().to_string(), value))
            .collect(),
        relations: agent
            .relations()
            .map(|(target, rel)| relation_snapshot(target.as_str(), rel))
            .collect(),
        external_relations: agent
            .external_relations()
            .map(|(actor, rel)| relation_snapshot(actor, rel))
            .collect(),
    }
}
