//! Feedback Kernels
//!
//! Emotion/relation feedback and decay rules for a single agent. Both
//! execution backends call these so they perform the same float operations
//! in the same order.

use crate::archetype::Archetype;
use crate::emotion::{decay_toward_zero, EmotionAxis, EmotionState};
use crate::relation::RelationVector;

/// Constants for the daily feedback phases
pub mod dynamics {
    /// Scales relation warmth before it touches emotions
    pub const DAMPING: f64 = 0.05;
    /// Emotion magnitude an axis must exceed to affect relations
    pub const EMOTION_THRESHOLD: f64 = 0.1;
    /// Scales emotion values before they touch relations
    pub const MILD_COEFFICIENT: f64 = 0.3;
    /// Extra trust loss when the anger pole is active
    pub const ANGER_TRUST_MULTIPLIER: f64 = 2.0;
    /// Positive utility/affinity/trust decays at this fraction of the step
    pub const POSITIVE_DECAY_FACTOR: f64 = 0.5;
    /// Negative utility/affinity/trust recovers at this fraction of the step
    pub const NEGATIVE_RECOVERY_FACTOR: f64 = 1.0;
    /// Positive responsiveness decays at this fraction of the step
    pub const RESPONSIVENESS_DECAY_FACTOR: f64 = 1.5;
    /// Negative responsiveness recovers at this fraction of the step
    pub const RESPONSIVENESS_RECOVERY_FACTOR: f64 = 1.0;
    /// Amplifies positive responsiveness changes applied to a negative value
    pub const RESPONSIVENESS_REPAIR_MULTIPLIER: f64 = 2.5;
}

/// Pushes the mean warmth of `relations` into every emotion axis.
///
/// Does nothing when `relations` is empty.
pub(crate) fn relation_to_emotion<'a, I>(
    emotions: &mut EmotionState,
    archetype: &Archetype,
    sensitivity: f64,
    relations: I,
) where
    I: IntoIterator<Item = &'a RelationVector>,
{
    let mut count = 0usize;
    let (mut affinity, mut trust, mut utility) = (0.0, 0.0, 0.0);
    for rel in relations {
        affinity += rel.affinity;
        trust += rel.trust;
        utility += rel.utility;
        count += 1;
    }
    if count == 0 {
        return;
    }

    let n = count as f64;
    let warmth = (affinity / n + trust / n + utility / n) / 3.0;
    let coefficients = archetype.emotion_coefficients();
    for axis in EmotionAxis::ALL {
        let delta = warmth * coefficients.get(axis) * dynamics::DAMPING * sensitivity;
        emotions.adjust(axis, delta, archetype.weights());
    }
}

/// Relation change one agent's current emotions push onto each of its edges
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct EmotionEffect {
    pub utility: f64,
    pub affinity: f64,
    pub trust: f64,
}

impl EmotionEffect {
    pub fn from_emotions(emotions: &EmotionState, sensitivity: f64) -> Self {
        let mut effect = EmotionEffect::default();
        for (axis, value) in emotions.values().iter() {
            if value.abs() <= dynamics::EMOTION_THRESHOLD {
                continue;
            }
            let scaled = value * dynamics::MILD_COEFFICIENT * sensitivity;
            match axis {
                EmotionAxis::JoySadness => effect.affinity += scaled,
                EmotionAxis::AngerHumility => {
                    let multiplier = if value < 0.0 {
                        dynamics::ANGER_TRUST_MULTIPLIER
                    } else {
                        1.0
                    };
                    effect.trust += scaled * multiplier;
                }
                EmotionAxis::FearCalm => effect.trust += scaled,
                EmotionAxis::OpennessAlienation => {
                    effect.trust += scaled;
                    effect.affinity += scaled;
                }
                EmotionAxis::DisgustAcceptance => {
                    effect.affinity += scaled;
                    effect.utility += scaled;
                }
                EmotionAxis::SurpriseHabit | EmotionAxis::ShameConfidence => {}
            }
        }
        effect
    }

    pub fn is_zero(&self) -> bool {
        self.utility == 0.0 && self.affinity == 0.0 && self.trust == 0.0
    }

    pub fn apply(&self, rel: &mut RelationVector) {
        rel.adjust_affinity(self.affinity);
        rel.adjust_trust(self.trust);
        rel.adjust_utility(self.utility);
    }
}

/// Pulls one edge toward zero by `step`.
///
/// Negative utility/affinity/trust recover faster than positive values fade.
pub(crate) fn decay_relation(rel: &mut RelationVector, step: f64) {
    use dynamics::*;

    let down = step * POSITIVE_DECAY_FACTOR;
    let up = step * NEGATIVE_RECOVERY_FACTOR;
    rel.utility = decay_toward_zero(rel.utility, down, up);
    rel.affinity = decay_toward_zero(rel.affinity, down, up);
    rel.trust = decay_toward_zero(rel.trust, down, up);
    rel.responsiveness = decay_toward_zero(
        rel.responsiveness,
        step * RESPONSIVENESS_DECAY_FACTOR,
        step * RESPONSIVENESS_RECOVERY_FACTOR,
    );
}

/// Adds `delta × sensitivity` to responsiveness, amplifying repairs of a
/// negative value.
pub(crate) fn bump_responsiveness(rel: &mut RelationVector, delta: f64, sensitivity: f64) {
    let mut change = delta * sensitivity;
    if delta > 0.0 && rel.responsiveness < 0.0 {
        change *= dynamics::RESPONSIVENESS_REPAIR_MULTIPLIER;
    }
    rel.adjust_responsiveness(change);
}
