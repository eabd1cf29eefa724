//! Reference backend: plain per-agent loops over the agent list.

use collective_events::InteractionRecord;

use crate::agent::Agent;
use crate::backend::{slot_of, BackendKind, EngineBackend, Phase, TickContext};
use crate::emotion::AxisValues;
use crate::engine::contagion::{accumulate, apply_pending, CONTAGION_RESPONSIVENESS};
use crate::engine::{
    commit_outcome, contagion_effects, plan_decision, Decision, EdgePair, InteractionRules,
    TargetView,
};
use crate::relation::{classify, Classification};
use crate::rng::{Stream, TickSeed};

/// Straightforward sequential execution
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl EngineBackend for ReferenceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Reference
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

        tracing::trace!("Phase {}", Phase::RelationDecay);
        for_each_active(agents, active, Agent::apply_relation_decay);
        tracing::trace!("Phase {}", Phase::RelationToEmotion);
        for_each_active(agents, active, Agent::react_to_relations);
        tracing::trace!("Phase {}", Phase::EmotionDecay);
        for_each_active(agents, active, Agent::apply_emotion_decay);
        tracing::trace!("Phase {}", Phase::EmotionToRelation);
        for_each_active(agents, active, Agent::react_to_emotions);

        tracing::trace!("Phase {}", Phase::Contagion);
        spread_emotions(agents, active, seed);

        let mut records = Vec::new();
        for round in 0..interactions_per_tick {
            tracing::trace!("Phase {} round {}", Phase::InteractionDecisions, round);
            interaction_round(agents, active, seed, round, tick, rules, &mut records);
        }
        records
    }
}

fn for_each_active(agents: &mut [Agent], active: &[bool], f: impl Fn(&mut Agent)) {
    for (agent, _) in agents
        .iter_mut()
        .zip(active.iter())
        .filter(|(_, is_active)| **is_active)
    {
        f(agent);
    }
}

fn spread_emotions(agents: &mut [Agent], active: &[bool], seed: TickSeed) {
    let mut pending = vec![AxisValues::default(); agents.len()];
    let mut reached = Vec::new();

    let snapshot: &[Agent] = agents;
    for (i, initiator) in snapshot.iter().enumerate() {
        if !active[i] {
            continue;
        }
        let edges = initiator.relations().filter_map(|(target_id, rel)| {
            let Some(j) = slot_of(snapshot, target_id) else {
                tracing::warn!("Agent {} relates to missing agent {}", initiator.id(), target_id);
                return None;
            };
            if !active[j] {
                return None;
            }
            let toward_initiator = snapshot[j].relation(initiator.id());
            if classify(&toward_initiator) == Classification::Avoid {
                return None;
            }
            Some((j, *rel))
        });

        let mut rng = seed.stream(Stream::Contagion, 0, i);
        let effects = contagion_effects(
            initiator.emotions(),
            initiator.sensitivity(),
            &mut rng,
            edges,
        );
        for (j, deltas) in effects {
            accumulate(&mut pending[j], &deltas);
            reached.push((i, snapshot[j].id().clone()));
        }
    }

    for (agent, deltas) in agents.iter_mut().zip(pending.iter()) {
        let weights = *agent.archetype().weights();
        apply_pending(agent.emotions_mut(), deltas, &weights);
    }
    for (i, target) in reached {
        agents[i].update_responsiveness(&target, CONTAGION_RESPONSIVENESS);
    }
}

fn interaction_round(
    agents: &mut [Agent],
    active: &[bool],
    seed: TickSeed,
    round: u32,
    tick: u64,
    rules: &InteractionRules,
    records: &mut Vec<InteractionRecord>,
) {
    let snapshot: &[Agent] = agents;
    let decisions: Vec<(usize, Decision<usize>)> = (0..snapshot.len())
        .filter(|&i| active[i])
        .map(|i| {
            let initiator = &snapshot[i];
            let candidates = (0..snapshot.len())
                .filter(|&j| j != i && active[j])
                .map(|j| (j, initiator.relation(snapshot[j].id())))
                .collect();
            let decision = plan_decision(
                rules,
                seed,
                round,
                i,
                initiator.archetype(),
                candidates,
                |&j: &usize| TargetView {
                    toward_initiator: snapshot[j].relation(initiator.id()),
                    refusal_chance: snapshot[j].archetype().refusal_chance(),
                },
            );
            (i, decision)
        })
        .collect();

    commit_decisions(agents, decisions, tick, records);
}

/// Applies planned decisions in order. A plan naming a slot outside the
/// agent list is recorded as an abstention and changes nothing.
fn commit_decisions(
    agents: &mut [Agent],
    decisions: Vec<(usize, Decision<usize>)>,
    tick: u64,
    records: &mut Vec<InteractionRecord>,
) {
    for (i, decision) in decisions {
        let Some(initiator_id) = agents.get(i).map(|a| a.id().clone()) else {
            tracing::warn!("Dropping decision for missing slot {}", i);
            continue;
        };
        match decision {
            Decision::Abstain => {
                records.push(InteractionRecord::abstention(tick, initiator_id.0));
            }
            Decision::Approach { target, outcome } => {
                let target_agent = match agents.get(target) {
                    Some(agent) if target != i => agent,
                    _ => {
                        tracing::warn!("Dropping decision of {}: no agent in slot {}", initiator_id, target);
                        records.push(InteractionRecord::abstention(tick, initiator_id.0));
                        continue;
                    }
                };
                let target_id = target_agent.id().clone();
                let mut forward = agents[i].relation(&target_id);
                let mut backward = target_agent.relation(&initiator_id);
                commit_outcome(
                    EdgePair {
                        forward: &mut forward,
                        backward: &mut backward,
                        initiator_sensitivity: agents[i].sensitivity(),
                        target_sensitivity: target_agent.sensitivity(),
                    },
                    outcome,
                );
                agents[i].set_relation(target_id.clone(), forward);
                agents[target].set_relation(initiator_id.clone(), backward);
                records.push(InteractionRecord::new(tick, initiator_id.0, target_id.0, outcome));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::archetype::ArchetypeRegistry;
    use collective_events::Outcome;

    #[test]
    fn test_stale_decision_is_dropped() {
        let registry = ArchetypeRegistry::builtin();
        let mut agents: Vec<Agent> = ["a", "b", "c"]
            .iter()
            .map(|name| Agent::new(AgentId::new(*name), registry.get("Hunt").unwrap(), 1.0).unwrap())
            .collect();
        let mut records = Vec::new();

        commit_decisions(
            &mut agents,
            vec![
                (
                    0,
                    Decision::Approach {
                        target: 9,
                        outcome: Outcome::Fail,
                    },
                ),
                (
                    1,
                    Decision::Approach {
                        target: 2,
                        outcome: Outcome::Success,
                    },
                ),
                (
                    2,
                    Decision::Approach {
                        target: 2,
                        outcome: Outcome::Success,
                    },
                ),
            ],
            4,
            &mut records,
        );

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], InteractionRecord::abstention(4, "a"));
        assert_eq!(agents[0].relation_count(), 0);
        assert_eq!(records[1], InteractionRecord::new(4, "b", "c", Outcome::Success));
        assert!(agents[1].relation(&AgentId::new("c")).trust > 0.0);
        assert!(agents[2].relation(&AgentId::new("b")).trust > 0.0);
        assert_eq!(records[2], InteractionRecord::abstention(4, "c"));
        assert!(!agents[2].has_relation(&AgentId::new("c")));
    }
}
