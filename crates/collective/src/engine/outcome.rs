//! Interaction Outcomes
//!
//! Refusal and success odds, and the paired-edge updates every interaction
//! commits. Each update touches both directions of the pair at once; there is
//! no way to apply an outcome to only one side.

use serde::{Deserialize, Serialize};

use crate::relation::RelationVector;

/// Constants for the refusal roll
pub mod refusal_constants {
    /// Divides responsiveness inside the logistic
    pub const REFUSAL_TEMPERATURE: f64 = 2.0;
    /// Refusal chance at which the plain logistic applies unchanged
    pub const REFERENCE_REFUSAL_CHANCE: f64 = 0.3;
    /// Refusal chances below this are treated as this value
    pub const MIN_REFUSAL_CHANCE: f64 = 0.05;
    /// Upper limit on refusal probability
    pub const MAX_REFUSAL_PROBABILITY: f64 = 0.95;
}

/// Step sizes for outcome updates, before sensitivity
pub mod outcome_steps {
    pub const SUCCESS_AFFINITY: f64 = 1.5;
    pub const SUCCESS_UTILITY: f64 = 1.0;
    pub const SUCCESS_TRUST: f64 = 2.0;
    pub const SUCCESS_RESPONSIVENESS: f64 = 1.0;

    pub const FAIL_TRUST: f64 = -1.5;
    pub const FAIL_AFFINITY: f64 = -0.5;
    pub const FAIL_UTILITY: f64 = -0.5;
    /// Contact happened, so responsiveness still rises
    pub const FAIL_RESPONSIVENESS: f64 = 0.5;

    pub const REFUSED_RESPONSIVENESS: f64 = -2.0;
    /// Applied on top when the initiator was already unresponsive
    pub const REFUSED_NEGATIVE_MULTIPLIER: f64 = 1.5;
    pub const REFUSED_AFFINITY: f64 = -1.5;
    pub const REFUSED_UTILITY: f64 = -0.5;

    pub const REFUSER_RESPONSIVENESS: f64 = -1.0;
    pub const REFUSER_AFFINITY: f64 = -0.5;
}

/// Probability that an approach is refused.
///
/// Logistic in the initiator's responsiveness toward the target,
/// `L = 1 / (1 + e^(r / 2))`, raised to `0.3 / chance` so that the reference
/// chance reproduces `L` exactly and lower chances shrink it. Capped at 0.95.
pub fn refusal_probability(refusal_chance: f64, responsiveness: f64) -> f64 {
    use refusal_constants::*;

    let logistic = 1.0 / (1.0 + (responsiveness / REFUSAL_TEMPERATURE).exp());
    let exponent = REFERENCE_REFUSAL_CHANCE / refusal_chance.max(MIN_REFUSAL_CHANCE);
    logistic.powf(exponent).min(MAX_REFUSAL_PROBABILITY)
}

/// Rules for the success roll once an approach is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionRules {
    /// Success chance before adjustments
    pub base_success_chance: f64,
    /// Initiator affinity is divided by this before being added
    pub affinity_scale: f64,
    /// Weight of the responder's temperament (reference chance minus its
    /// refusal chance)
    pub disposition_weight: f64,
    pub min_success_chance: f64,
    pub max_success_chance: f64,
}

impl Default for InteractionRules {
    fn default() -> Self {
        Self {
            base_success_chance: 0.5,
            affinity_scale: 20.0,
            disposition_weight: 1.0,
            min_success_chance: 0.1,
            max_success_chance: 0.9,
        }
    }
}

impl InteractionRules {
    /// Chance that an accepted interaction succeeds.
    pub fn success_chance(&self, affinity: f64, responder_refusal_chance: f64) -> f64 {
        let affinity_term = if self.affinity_scale != 0.0 {
            affinity / self.affinity_scale
        } else {
            0.0
        };
        let disposition = self.disposition_weight
            * (refusal_constants::REFERENCE_REFUSAL_CHANCE - responder_refusal_chance);
        let chance = self.base_success_chance + affinity_term + disposition;

        let (lo, hi) = if self.min_success_chance <= self.max_success_chance {
            (self.min_success_chance, self.max_success_chance)
        } else {
            (self.max_success_chance, self.min_success_chance)
        };
        chance.clamp(lo, hi)
    }
}

/// Both directed edges between an initiator and its target
#[derive(Debug)]
pub struct EdgePair<'a> {
    /// Initiator's view of the target
    pub forward: &'a mut RelationVector,
    /// Target's view of the initiator
    pub backward: &'a mut RelationVector,
    pub initiator_sensitivity: f64,
    pub target_sensitivity: f64,
}

/// Commits a refusal. The initiator's edge drops sharply; the refuser's edge
/// cools a little.
pub fn process_refusal(pair: EdgePair<'_>) {
    use outcome_steps::*;

    let s = pair.initiator_sensitivity;
    let mut drop = REFUSED_RESPONSIVENESS * s;
    if pair.forward.responsiveness < 0.0 {
        drop *= REFUSED_NEGATIVE_MULTIPLIER;
    }
    pair.forward.adjust_responsiveness(drop);
    pair.forward.adjust_affinity(REFUSED_AFFINITY * s);
    pair.forward.adjust_utility(REFUSED_UTILITY * s);

    let t = pair.target_sensitivity;
    pair.backward.adjust_responsiveness(REFUSER_RESPONSIVENESS * t);
    pair.backward.adjust_affinity(REFUSER_AFFINITY * t);
}

/// Commits an accepted interaction on both edges.
///
/// Success improves every dimension. Failure costs trust most, but
/// responsiveness still rises because contact happened.
pub fn process_interaction_result(pair: EdgePair<'_>, success: bool) {
    apply_contact(pair.forward, pair.initiator_sensitivity, success);
    apply_contact(pair.backward, pair.target_sensitivity, success);
}

fn apply_contact(rel: &mut RelationVector, sensitivity: f64, success: bool) {
    use outcome_steps::*;

    if success {
        rel.adjust_affinity(SUCCESS_AFFINITY * sensitivity);
        rel.adjust_utility(SUCCESS_UTILITY * sensitivity);
        rel.adjust_trust(SUCCESS_TRUST * sensitivity);
        rel.adjust_responsiveness(SUCCESS_RESPONSIVENESS * sensitivity);
    } else {
        rel.adjust_trust(FAIL_TRUST * sensitivity);
        rel.adjust_affinity(FAIL_AFFINITY * sensitivity);
        rel.adjust_utility(FAIL_UTILITY * sensitivity);
        rel.adjust_responsiveness(FAIL_RESPONSIVENESS * sensitivity);
    }
}

/// Moves an agent's view of an external actor by its primary emotion.
///
/// Only the agent's side is written here; the actor updates itself through
/// [`crate::external::ExternalActor`].
pub fn process_external_contact(rel: &mut RelationVector, primary_value: f64, sensitivity: f64) {
    let delta = primary_value * sensitivity;
    rel.adjust_affinity(delta);
    rel.adjust_trust(delta);
    rel.adjust_utility(delta);
}
