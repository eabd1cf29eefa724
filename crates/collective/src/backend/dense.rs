//! Dense backend.
//!
//! Keeps the relation graph as an `n × n` matrix with a presence mask and a
//! sorted column list per row. The graph lives across ticks: relations set
//! between ticks are written into it in place, and membership changes drop
//! it so the next tick packs it again. Per-agent phases run in parallel with
//! rayon over stored edges only. Shared-state phases plan in parallel from a
//! snapshot and commit sequentially in slot order.

use std::fmt;
use std::sync::Arc;

use collective_events::InteractionRecord;
use rayon::prelude::*;

use crate::agent::{Agent, AgentId};
use crate::archetype::Archetype;
use crate::backend::{slot_of, BackendKind, EngineBackend, Phase, TickContext};
use crate::emotion::{AxisValues, EmotionState};
use crate::engine::contagion::{accumulate, apply_pending, CONTAGION_RESPONSIVENESS};
use crate::engine::feedback::{self, EmotionEffect};
use crate::engine::{
    commit_outcome, contagion_effects, plan_decision, Decision, EdgePair, InteractionRules,
    TargetView,
};
use crate::relation::{classify, Classification, RelationVector};
use crate::rng::{Stream, TickSeed};

/// Contiguous-array execution for large populations
#[derive(Default)]
pub struct DenseBackend {
    graph: Option<DenseGraph>,
}

impl fmt::Debug for DenseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseBackend")
            .field("packed_agents", &self.graph.as_ref().map(|g| g.n))
            .finish()
    }
}

impl EngineBackend for DenseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Dense
    }

    fn run_tick(&mut self, ctx: TickContext<'_>) -> Vec<InteractionRecord> {
        let TickContext {
            tick,
            seed,
            agents,
            active,
            interactions_per_tick,
            rules,
        } = ctx;

        if !self.graph.as_ref().is_some_and(|g| g.matches(agents)) {
            tracing::debug!("Packing dense graph for {} agents", agents.len());
            self.graph = Some(DenseGraph::pack(agents));
        }
        let Some(graph) = self.graph.as_mut() else {
            return Vec::new();
        };
        graph.load_emotions(agents);

        tracing::trace!("Phase {}", Phase::RelationDecay);
        graph.decay_relations(active);
        tracing::trace!("Phase {}", Phase::RelationToEmotion);
        graph.relations_to_emotions(active);
        tracing::trace!("Phase {}", Phase::EmotionDecay);
        graph.decay_emotions(active);
        tracing::trace!("Phase {}", Phase::EmotionToRelation);
        graph.emotions_to_relations(active);

        tracing::trace!("Phase {}", Phase::Contagion);
        graph.spread_emotions(active, seed);

        let mut records = Vec::new();
        for round in 0..interactions_per_tick {
            tracing::trace!("Phase {} round {}", Phase::InteractionDecisions, round);
            let decisions = graph.plan_round(active, seed, round, rules);
            graph.commit_decisions(decisions, tick, &mut records);
        }

        graph.write_back(agents, active);
        records
    }

    fn membership_changed(&mut self) {
        self.graph = None;
    }

    fn relation_set(&mut self, from: usize, to: usize, relation: RelationVector) {
        if let Some(graph) = self.graph.as_mut() {
            if from < graph.n && to < graph.n && from != to {
                graph.relations[from * graph.n + to] = relation;
                graph.link(from, to);
            }
        }
    }
}

/// Packed copy of the population kept between ticks
struct DenseGraph {
    n: usize,
    ids: Vec<AgentId>,
    archetypes: Vec<Arc<Archetype>>,
    sensitivity: Vec<f64>,
    /// Reloaded from the agents at the start of every tick
    emotions: Vec<EmotionState>,
    /// Row `i` holds agent `i`'s view of every other agent; absent edges
    /// stay zero
    relations: Vec<RelationVector>,
    present: Vec<bool>,
    /// Present columns of each row, ascending
    columns: Vec<Vec<usize>>,
}

impl DenseGraph {
    fn pack(agents: &[Agent]) -> Self {
        let n = agents.len();
        let mut relations = vec![RelationVector::ZERO; n * n];
        let mut present = vec![false; n * n];
        let mut columns = vec![Vec::new(); n];

        for (i, agent) in agents.iter().enumerate() {
            for (target, rel) in agent.relations() {
                match slot_of(agents, target) {
                    Some(j) => {
                        relations[i * n + j] = *rel;
                        present[i * n + j] = true;
                        columns[i].push(j);
                    }
                    None => {
                        tracing::warn!("Agent {} relates to missing agent {}", agent.id(), target)
                    }
                }
            }
        }

        Self {
            n,
            ids: agents.iter().map(|a| a.id().clone()).collect(),
            archetypes: agents.iter().map(|a| Arc::clone(a.archetype())).collect(),
            sensitivity: agents.iter().map(Agent::sensitivity).collect(),
            emotions: agents.iter().map(|a| *a.emotions()).collect(),
            relations,
            present,
            columns,
        }
    }

    /// Whether this graph was packed from the same agents, in the same slots.
    fn matches(&self, agents: &[Agent]) -> bool {
        self.n == agents.len() && self.ids.iter().zip(agents).all(|(id, a)| id == a.id())
    }

    fn load_emotions(&mut self, agents: &[Agent]) {
        for (emotion, agent) in self.emotions.iter_mut().zip(agents) {
            *emotion = *agent.emotions();
        }
    }

    /// Marks `i → j` as stored.
    fn link(&mut self, i: usize, j: usize) {
        let k = i * self.n + j;
        if self.present[k] {
            return;
        }
        self.present[k] = true;
        if let Err(pos) = self.columns[i].binary_search(&j) {
            self.columns[i].insert(pos, j);
        }
    }

    /// Writes emotions and relations of active agents back.
    ///
    /// Stored edges only grow during a tick, so an agent whose map still has
    /// as many entries as its row has columns is updated in place.
    fn write_back(&self, agents: &mut [Agent], active: &[bool]) {
        let n = self.n;
        agents
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| active[*i])
            .for_each(|(i, agent)| {
                *agent.emotions_mut() = self.emotions[i];

                let row = &self.relations[i * n..(i + 1) * n];
                let columns = &self.columns[i];
                if agent.relation_count() == columns.len() {
                    for (rel, &j) in agent.relation_values_mut().zip(columns) {
                        *rel = row[j];
                    }
                } else {
                    agent.replace_relations(
                        columns
                            .iter()
                            .map(|&j| (self.ids[j].clone(), row[j]))
                            .collect(),
                    );
                }
            });
    }

    fn decay_relations(&mut self, active: &[bool]) {
        let n = self.n;
        if n == 0 {
            return;
        }
        let Self {
            archetypes,
            sensitivity,
            relations,
            columns,
            ..
        } = self;

        relations
            .par_chunks_mut(n)
            .zip(columns.par_iter())
            .enumerate()
            .filter(|(i, _)| active[*i])
            .for_each(|(i, (row, cols))| {
                let step = archetypes[i].decay_rate() * sensitivity[i];
                for &j in cols {
                    feedback::decay_relation(&mut row[j], step);
                }
            });
    }

    fn relations_to_emotions(&mut self, active: &[bool]) {
        let n = self.n;
        let Self {
            archetypes,
            sensitivity,
            emotions,
            relations,
            columns,
            ..
        } = self;
        let relations: &[RelationVector] = relations;

        emotions
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| active[*i])
            .for_each(|(i, emotion)| {
                let row = columns[i].iter().map(|&j| &relations[i * n + j]);
                feedback::relation_to_emotion(emotion, &archetypes[i], sensitivity[i], row);
            });
    }

    fn decay_emotions(&mut self, active: &[bool]) {
        let Self {
            archetypes,
            sensitivity,
            emotions,
            ..
        } = self;

        emotions
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| active[*i])
            .for_each(|(i, emotion)| {
                emotion.decay(archetypes[i].emotion_decay() * sensitivity[i]);
            });
    }

    fn emotions_to_relations(&mut self, active: &[bool]) {
        let n = self.n;
        if n == 0 {
            return;
        }
        let Self {
            sensitivity,
            emotions,
            relations,
            columns,
            ..
        } = self;
        let emotions: &[EmotionState] = emotions;

        relations
            .par_chunks_mut(n)
            .zip(columns.par_iter())
            .enumerate()
            .filter(|(i, _)| active[*i])
            .for_each(|(i, (row, cols))| {
                let effect = EmotionEffect::from_emotions(&emotions[i], sensitivity[i]);
                if effect.is_zero() {
                    return;
                }
                for &j in cols {
                    effect.apply(&mut row[j]);
                }
            });
    }

    fn spread_emotions(&mut self, active: &[bool], seed: TickSeed) {
        let n = self.n;
        let this: &Self = self;

        let plans: Vec<(usize, Vec<(usize, AxisValues)>)> = (0..n)
            .into_par_iter()
            .filter(|&i| active[i])
            .map(|i| {
                let edges = this.columns[i]
                    .iter()
                    .copied()
                    .filter(|&j| active[j])
                    .filter(|&j| classify(&this.relations[j * n + i]) != Classification::Avoid)
                    .map(|j| (j, this.relations[i * n + j]));
                let mut rng = seed.stream(Stream::Contagion, 0, i);
                let effects =
                    contagion_effects(&this.emotions[i], this.sensitivity[i], &mut rng, edges);
                (i, effects)
            })
            .collect();

        let mut pending = vec![AxisValues::default(); n];
        for (_, effects) in &plans {
            for (j, deltas) in effects {
                accumulate(&mut pending[*j], deltas);
            }
        }
        for (j, deltas) in pending.iter().enumerate() {
            let weights = *self.archetypes[j].weights();
            apply_pending(&mut self.emotions[j], deltas, &weights);
        }
        for (i, effects) in plans {
            for (j, _) in effects {
                let rel = &mut self.relations[i * n + j];
                feedback::bump_responsiveness(rel, CONTAGION_RESPONSIVENESS, self.sensitivity[i]);
            }
        }
    }

    fn plan_round(
        &self,
        active: &[bool],
        seed: TickSeed,
        round: u32,
        rules: &InteractionRules,
    ) -> Vec<(usize, Decision<usize>)> {
        let n = self.n;

        (0..n)
            .into_par_iter()
            .filter(|&i| active[i])
            .map(|i| {
                let candidates = (0..n)
                    .filter(|&j| j != i && active[j])
                    .map(|j| (j, self.relations[i * n + j]))
                    .collect();
                let decision = plan_decision(
                    rules,
                    seed,
                    round,
                    i,
                    &self.archetypes[i],
                    candidates,
                    |&j: &usize| TargetView {
                        toward_initiator: self.relations[j * n + i],
                        refusal_chance: self.archetypes[j].refusal_chance(),
                    },
                );
                (i, decision)
            })
            .collect()
    }

    /// Applies planned decisions in order. A plan naming a slot outside the
    /// graph is recorded as an abstention and changes nothing.
    fn commit_decisions(
        &mut self,
        decisions: Vec<(usize, Decision<usize>)>,
        tick: u64,
        records: &mut Vec<InteractionRecord>,
    ) {
        let n = self.n;
        for (i, decision) in decisions {
            let Some(initiator_id) = self.ids.get(i).cloned() else {
                tracing::warn!("Dropping decision for missing slot {}", i);
                continue;
            };
            match decision {
                Decision::Abstain => {
                    records.push(InteractionRecord::abstention(tick, initiator_id.0));
                }
                Decision::Approach { target: j, outcome } => {
                    if j >= n || j == i {
                        tracing::warn!("Dropping decision of {}: no agent in slot {}", initiator_id, j);
                        records.push(InteractionRecord::abstention(tick, initiator_id.0));
                        continue;
                    }
                    let mut forward = self.relations[i * n + j];
                    let mut backward = self.relations[j * n + i];
                    commit_outcome(
                        EdgePair {
                            forward: &mut forward,
                            backward: &mut backward,
                            initiator_sensitivity: self.sensitivity[i],
                            target_sensitivity: self.sensitivity[j],
                        },
                        outcome,
                    );
                    self.relations[i * n + j] = forward;
                    self.relations[j * n + i] = backward;
                    self.link(i, j);
                    self.link(j, i);
                    records.push(InteractionRecord::new(
                        tick,
                        initiator_id.0,
                        self.ids[j].as_str(),
                        outcome,
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeRegistry;
    use collective_events::Outcome;

    fn agents(names: &[&str]) -> Vec<Agent> {
        let registry = ArchetypeRegistry::builtin();
        names
            .iter()
            .map(|name| {
                Agent::new(AgentId::new(*name), registry.get("Trailblaze").unwrap(), 1.0).unwrap()
            })
            .collect()
    }

    fn tick(backend: &mut DenseBackend, agents: &mut [Agent], tick: u64) -> Vec<InteractionRecord> {
        let active = vec![true; agents.len()];
        let rules = InteractionRules::default();
        backend.run_tick(TickContext {
            tick,
            seed: TickSeed(tick + 1),
            agents,
            active: &active,
            interactions_per_tick: 1,
            rules: &rules,
        })
    }

    #[test]
    fn test_graph_is_kept_between_ticks() {
        let mut agents = agents(&["a", "b", "c", "d"]);
        let mut backend = DenseBackend::default();

        tick(&mut backend, &mut agents, 0);
        let matrix = backend.graph.as_ref().unwrap().relations.as_ptr();
        for t in 1..5 {
            tick(&mut backend, &mut agents, t);
        }
        assert_eq!(backend.graph.as_ref().unwrap().relations.as_ptr(), matrix);

        // every edge created by interactions is visible on the agents
        let graph = backend.graph.as_ref().unwrap();
        for (i, agent) in agents.iter().enumerate() {
            assert_eq!(agent.relation_count(), graph.columns[i].len());
            for &j in &graph.columns[i] {
                assert_eq!(agent.relation(&graph.ids[j]), graph.relations[i * 4 + j]);
            }
        }
    }

    #[test]
    fn test_relation_set_updates_graph_in_place() {
        let mut agents = agents(&["a", "b", "c"]);
        let mut backend = DenseBackend::default();
        tick(&mut backend, &mut agents, 0);

        let rel = RelationVector::new(1.0, 2.0, 3.0, 4.0);
        backend.relation_set(2, 0, rel);
        let graph = backend.graph.as_ref().unwrap();
        assert_eq!(graph.relations[2 * 3], rel);
        assert!(graph.present[2 * 3]);
        assert!(graph.columns[2].contains(&0));
        assert!(graph.columns[2].windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_changed_agents_are_repacked() {
        let mut agents = agents(&["a", "b", "c"]);
        let mut backend = DenseBackend::default();
        tick(&mut backend, &mut agents, 0);

        let mut others = self::agents(&["x", "y", "z"]);
        assert!(!backend.graph.as_ref().unwrap().matches(&others));
        tick(&mut backend, &mut others, 1);
        assert_eq!(backend.graph.as_ref().unwrap().ids[0], AgentId::new("x"));

        backend.membership_changed();
        assert!(backend.graph.is_none());
    }

    #[test]
    fn test_stale_decision_is_dropped() {
        let agents = agents(&["a", "b", "c"]);
        let mut graph = DenseGraph::pack(&agents);
        let mut records = Vec::new();

        graph.commit_decisions(
            vec![
                (
                    0,
                    Decision::Approach {
                        target: 7,
                        outcome: Outcome::Success,
                    },
                ),
                (
                    1,
                    Decision::Approach {
                        target: 2,
                        outcome: Outcome::Success,
                    },
                ),
            ],
            3,
            &mut records,
        );

        assert_eq!(records.len(), 2);
        assert!(records[0].is_abstention());
        assert_eq!(records[0].from, "a");
        assert!(graph.columns[0].is_empty());
        assert_eq!(records[1], InteractionRecord::new(3, "b", "c", Outcome::Success));
        assert!(graph.relations[3 + 2].trust > 0.0);
        assert!(graph.relations[2 * 3 + 1].trust > 0.0);
    }
}
