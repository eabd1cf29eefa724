//! Emotion contagion.
//!
//! An initiator spreads its emotions onto the agents it relates to. Effects
//! are planned from a snapshot and applied afterwards in one batch.

use rand::Rng;

use crate::emotion::{AxisValues, EmotionAxis, EmotionState};
use crate::relation::RelationVector;

/// Relation warmth (a + t + u) that yields full contagion strength
pub const FULL_STRENGTH_WARMTH: f64 = 30.0;
/// Responsiveness the initiator gains toward each reached target
pub const CONTAGION_RESPONSIVENESS: f64 = 0.5;

/// How strongly emotion travels along a relation, in [0, 1].
pub fn contagion_strength(relation: &RelationVector) -> f64 {
    let warmth = relation.affinity + relation.trust + relation.utility;
    (warmth / FULL_STRENGTH_WARMTH).clamp(0.0, 1.0)
}

/// Raw emotion deltas an initiator sends to each eligible target.
///
/// `edges` holds the initiator's relation toward every target that accepts
/// its influence. Targets reached with zero strength are left out. Each axis
/// carries `value × strength × |value| / total × sensitivity`, so the primary
/// emotion dominates and the rest follows proportionally.
pub fn contagion_effects<T, R, I>(
    emotions: &EmotionState,
    sensitivity: f64,
    rng: &mut R,
    edges: I,
) -> Vec<(T, AxisValues)>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = (T, RelationVector)>,
{
    let Some((primary_axis, primary_value)) = emotions.primary(rng) else {
        return Vec::new();
    };
    let total = emotions.total_intensity();
    let primary_weight = primary_value.abs() / total;

    let mut effects = Vec::new();
    for (target, rel) in edges {
        let strength = contagion_strength(&rel);
        if strength <= 0.0 {
            continue;
        }

        let mut deltas = AxisValues::default();
        *deltas.get_mut(primary_axis) = primary_value * strength * primary_weight * sensitivity;
        for axis in EmotionAxis::ALL {
            if axis == primary_axis {
                continue;
            }
            let value = emotions.get(axis);
            if value == 0.0 {
                continue;
            }
            *deltas.get_mut(axis) = value * strength * (value.abs() / total) * sensitivity;
        }
        effects.push((target, deltas));
    }
    effects
}

/// Adds `deltas` axis by axis into `pending`.
pub(crate) fn accumulate(pending: &mut AxisValues, deltas: &AxisValues) {
    for axis in EmotionAxis::ALL {
        *pending.get_mut(axis) += deltas.get(axis);
    }
}

/// Applies accumulated deltas through the target's own weights.
pub(crate) fn apply_pending(emotions: &mut EmotionState, pending: &AxisValues, weights: &AxisValues) {
    for (axis, delta) in pending.iter() {
        if delta != 0.0 {
            emotions.adjust(axis, delta, weights);
        }
    }
}
