//! Contagion through a whole population
//!
//! Ticks with zero interaction rounds leave contagion as the only phase that
//! moves emotion between agents.

use collective::{AgentId, BackendKind, EmotionAxis, Population, RelationVector};

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

/// A is joyful and warm toward B and C; B has written A off.
fn joyful_trio(backend: BackendKind, sensitivity: f64) -> Population {
    let mut population = Population::with_backend(4, backend);
    population
        .add_agent("A", "Trailblaze", sensitivity, &[(EmotionAxis::JoySadness, 3.0)])
        .unwrap();
    population.add_agent("B", "Trailblaze", 1.0, &[]).unwrap();
    population.add_agent("C", "Trailblaze", 1.0, &[]).unwrap();

    let warm = RelationVector::new(6.0, 6.0, 6.0, 0.0);
    population.set_relation(&id("A"), &id("B"), warm).unwrap();
    population.set_relation(&id("A"), &id("C"), warm).unwrap();
    population
        .set_relation(&id("B"), &id("A"), RelationVector::new(0.0, 0.0, 0.0, -9.0))
        .unwrap();
    population
}

fn joy(population: &Population, name: &str) -> f64 {
    population
        .emotion_state(&id(name))
        .unwrap()
        .get(EmotionAxis::JoySadness)
}

/// Test that emotion reaches C but not B, who avoids A
#[test]
fn test_avoiding_target_receives_nothing() {
    for backend in [BackendKind::Reference, BackendKind::Dense] {
        let mut population = joyful_trio(backend, 1.0);

        let records = population.run_tick(0);

        assert!(records.is_empty());
        assert_eq!(joy(&population, "B"), 0.0, "{}", backend);
        assert!(joy(&population, "C") > 0.0, "{}", backend);
        assert!(population.emotion_state(&id("B")).unwrap().is_neutral());
    }
}

/// Test that A grows more responsive toward every agent it reached
#[test]
fn test_reached_targets_raise_responsiveness() {
    for backend in [BackendKind::Reference, BackendKind::Dense] {
        for sensitivity in [1.0, 2.0] {
            let mut population = joyful_trio(backend, sensitivity);

            population.run_tick(0);

            let to_b = population.relation(&id("A"), &id("B"));
            let to_c = population.relation(&id("A"), &id("C"));
            assert_eq!(to_b.responsiveness, 0.0, "{}", backend);
            assert!(
                (to_c.responsiveness - 0.5 * sensitivity).abs() < 1e-12,
                "{} sensitivity {}: {}",
                backend,
                sensitivity,
                to_c.responsiveness
            );
        }
    }
}

/// Test that agents left out of a subset tick are not reached
#[test]
fn test_inactive_agents_are_not_reached() {
    for backend in [BackendKind::Reference, BackendKind::Dense] {
        let mut population = joyful_trio(backend, 1.0);

        population
            .run_tick_for_subset(&[id("A"), id("B")], 0)
            .unwrap();

        assert_eq!(joy(&population, "C"), 0.0, "{}", backend);
        assert_eq!(population.relation(&id("A"), &id("C")).responsiveness, 0.0);

        // once C takes part it is reached like before
        population.run_tick(0);
        assert!(joy(&population, "C") > 0.0, "{}", backend);
        assert!(population.relation(&id("A"), &id("C")).responsiveness > 0.0);
    }
}
