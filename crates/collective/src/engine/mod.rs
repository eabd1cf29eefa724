//! Interaction Engine
//!
//! Stateless rules shared by every execution backend: feedback kernels,
//! scoring, target selection, outcome application and contagion.

pub mod contagion;
pub mod feedback;
pub mod outcome;
pub mod scoring;
pub mod selection;

pub use contagion::{contagion_effects, contagion_strength};
pub use feedback::dynamics;
pub use outcome::{
    process_external_contact, process_interaction_result, process_refusal, refusal_probability,
    EdgePair, InteractionRules,
};
pub use scoring::priority_score;
pub use selection::{categorize, choose_target, softmax, Categories};

use collective_events::Outcome;

use crate::archetype::Archetype;
use crate::relation::{classify, Classification, RelationVector};
use crate::rng::{Stream, TickSeed};

/// What the target of an approach thinks, read from the round snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TargetView {
    pub toward_initiator: RelationVector,
    pub refusal_chance: f64,
}

/// One agent's decision for one interaction round
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decision<T> {
    /// No eligible partner
    Abstain,
    Approach { target: T, outcome: Outcome },
}

/// Decides whom the agent in `slot` approaches and how it ends.
///
/// Reads only the snapshot values passed in; nothing is mutated. The target
/// refuses outright when it classifies the initiator as avoid, otherwise a
/// refusal roll and then a success roll decide.
pub(crate) fn plan_decision<T, F>(
    rules: &InteractionRules,
    seed: TickSeed,
    round: u32,
    slot: usize,
    archetype: &Archetype,
    candidates: Vec<(T, RelationVector)>,
    target_view: F,
) -> Decision<T>
where
    T: Clone + PartialEq,
    F: Fn(&T) -> TargetView,
{
    let categories = categorize(candidates);
    let mut rng = seed.stream(Stream::Decision, round, slot);
    let Some(target) = choose_target(
        archetype.scoring(),
        archetype.temperature(),
        &categories.mandatory,
        &categories.optional,
        &mut rng,
    ) else {
        return Decision::Abstain;
    };

    let forward = categories
        .pool()
        .iter()
        .find(|(key, _)| *key == target)
        .map(|(_, rel)| *rel)
        .unwrap_or_default();
    let view = target_view(&target);

    let avoided = classify(&view.toward_initiator) == Classification::Avoid;
    let refused = avoided
        || seed.roll(Stream::Refusal, round, slot)
            < refusal_probability(archetype.refusal_chance(), forward.responsiveness);

    let outcome = if refused {
        Outcome::Refusal
    } else if seed.roll(Stream::Outcome, round, slot)
        < rules.success_chance(forward.affinity, view.refusal_chance)
    {
        Outcome::Success
    } else {
        Outcome::Fail
    };

    Decision::Approach { target, outcome }
}

/// Applies `outcome` to both edges of the pair.
pub(crate) fn commit_outcome(pair: EdgePair<'_>, outcome: Outcome) {
    match outcome {
        Outcome::Refusal => process_refusal(pair),
        Outcome::Success => process_interaction_result(pair, true),
        Outcome::Fail => process_interaction_result(pair, false),
    }
}
