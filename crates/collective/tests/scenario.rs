//! Scenario tests
//!
//! Small hand-built populations with known expectations.

use collective::{
    classify, refusal_probability, AgentId, ArchetypeRegistry, Classification, Outcome,
    Population, RelationVector,
};

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

fn assert_population_in_bounds(population: &Population) {
    for agent in population.agents() {
        for (axis, value) in agent.emotions().values().iter() {
            assert!(
                (-3.0..=3.0).contains(&value),
                "{} {} out of bounds: {}",
                agent.id(),
                axis,
                value
            );
        }
        for (target, rel) in agent.relations() {
            assert!(
                rel.is_within_bounds(),
                "{} -> {} out of bounds: {:?}",
                agent.id(),
                target,
                rel
            );
        }
    }
}

/// Three Harmony agents, A already leaning toward B.
#[test]
fn test_harmony_trio_keeps_a_to_b_open() {
    let mut population = Population::new(42);
    for name in ["A", "B", "C"] {
        population.add_agent(name, "Harmony", 1.0, &[]).unwrap();
    }
    population
        .set_relation(&id("A"), &id("B"), RelationVector::new(2.0, -1.0, 1.0, 0.0))
        .unwrap();

    for tick in 0..10 {
        let records = population.run_tick(1);
        assert_eq!(records.len(), 3, "tick {}", tick);
        assert!(records.iter().all(|r| r.tick == tick));
        assert_population_in_bounds(&population);
    }

    assert_eq!(population.tick(), 10);
    let a_to_b = population.relation(&id("A"), &id("B"));
    assert_ne!(classify(&a_to_b), Classification::Avoid, "{:?}", a_to_b);
}

#[test]
fn test_every_agent_decides_once_per_round() {
    let mut population = Population::new(3);
    for (name, archetype) in [
        ("a", "Hunt"),
        ("b", "Elation"),
        ("c", "Nihility"),
        ("d", "Preservation"),
    ] {
        population.add_agent(name, archetype, 1.0, &[]).unwrap();
    }

    for _ in 0..5 {
        let records = population.run_tick(2);
        assert_eq!(records.len(), 8);
        for name in ["a", "b", "c", "d"] {
            assert_eq!(records.iter().filter(|r| r.from == name).count(), 2);
        }
    }
}

#[test]
fn test_refusal_floor_for_low_base_chances() {
    let registry = ArchetypeRegistry::builtin();
    for name in registry.names() {
        let archetype = registry.get(name).unwrap();
        if archetype.refusal_chance() > 0.3 {
            continue;
        }
        let p = refusal_probability(archetype.refusal_chance(), -10.0);
        assert!(p > 0.9, "{} refuses with only {}", name, p);
    }
}

#[test]
fn test_cold_shoulder_is_mostly_refused() {
    // A has written B off; B is the only candidate so A keeps approaching
    let mut refused = 0;
    let mut total = 0;
    for seed in 0..40 {
        let mut population = Population::new(seed);
        population.add_agent("A", "Harmony", 1.0, &[]).unwrap();
        population.add_agent("B", "Harmony", 1.0, &[]).unwrap();
        population
            .set_relation(&id("A"), &id("B"), RelationVector::new(0.0, 0.0, 0.0, -4.9))
            .unwrap();

        let records = population.run_tick(1);
        for record in records.iter().filter(|r| r.from == "A") {
            total += 1;
            if record.outcome == Outcome::Refusal {
                refused += 1;
            }
        }
    }
    assert_eq!(total, 40);
    assert!(refused > 20, "only {} of {} refused", refused, total);
}

#[test]
fn test_mutual_avoidance_means_abstention() {
    let mut population = Population::new(11);
    population.add_agent("A", "Hunt", 1.0, &[]).unwrap();
    population.add_agent("B", "Hunt", 1.0, &[]).unwrap();
    let hostile = RelationVector::new(0.0, -8.0, -8.0, -9.0);
    population.set_relation(&id("A"), &id("B"), hostile).unwrap();
    population.set_relation(&id("B"), &id("A"), hostile).unwrap();

    let records = population.run_tick(1);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.is_abstention()));
}
