//! Shared setup for integration tests

#![allow(dead_code)]

use collective::{AgentId, BackendKind, EmotionAxis, Population, RelationVector};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const ARCHETYPES: [&str; 9] = [
    "Erudition",
    "Enigmata",
    "Harmony",
    "Hunt",
    "Elation",
    "Preservation",
    "Nihility",
    "Trailblaze",
    "Remembrance",
];

/// Builds a population of `size` agents with random archetypes, emotions
/// and relations. The same `setup_seed` always yields the same population.
pub fn random_population(
    seed: u64,
    backend: BackendKind,
    size: usize,
    setup_seed: u64,
) -> Population {
    let mut rng = SmallRng::seed_from_u64(setup_seed);
    let mut population = Population::with_backend(seed, backend);

    for i in 0..size {
        let archetype = ARCHETYPES[rng.gen_range(0..ARCHETYPES.len())];
        let sensitivity = rng.gen_range(0.2..2.0);
        let emotions: Vec<(EmotionAxis, f64)> = EmotionAxis::ALL
            .iter()
            .map(|&axis| (axis, rng.gen_range(-4.0..4.0)))
            .collect();
        population
            .add_agent(format!("agent-{:02}", i), archetype, sensitivity, &emotions)
            .unwrap();
    }

    let ids: Vec<AgentId> = population.agent_ids().cloned().collect();
    for from in &ids {
        for to in &ids {
            if from == to || rng.gen_bool(0.4) {
                continue;
            }
            let rel = RelationVector::new(
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-12.0..12.0),
            );
            population.set_relation(from, to, rel).unwrap();
        }
    }
    population
}

pub fn assert_in_bounds(population: &Population) {
    for agent in population.agents() {
        for (axis, value) in agent.emotions().values().iter() {
            assert!(
                (-3.0..=3.0).contains(&value),
                "tick {}: {} {} = {}",
                population.tick(),
                agent.id(),
                axis,
                value
            );
        }
        for (target, rel) in agent.relations() {
            assert!(
                rel.is_within_bounds(),
                "tick {}: {} -> {} = {:?}",
                population.tick(),
                agent.id(),
                target,
                rel
            );
        }
    }
}
