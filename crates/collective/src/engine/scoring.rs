//! Priority scoring of candidate partners.

use crate::archetype::ScoringConfig;
use crate::relation::RelationVector;

/// Trust counts extra toward priority
pub const TRUST_WEIGHT: f64 = 1.5;
/// Negative responsiveness weighs heavier than positive
pub const NEGATIVE_RESPONSIVENESS_WEIGHT: f64 = 1.5;

/// Scores how attractive a partner is given the relation toward them.
///
/// `f(affinity) + f(utility) + 1.5·f(trust) + m·f(responsiveness)` where
/// each `f` is the archetype's transform for that dimension and `m` is 1.5
/// for negative responsiveness, 1.0 otherwise.
pub fn priority_score(scoring: &ScoringConfig, relation: &RelationVector) -> f64 {
    let responsiveness_weight = if relation.responsiveness < 0.0 {
        NEGATIVE_RESPONSIVENESS_WEIGHT
    } else {
        1.0
    };

    scoring.affinity.apply(relation.affinity)
        + scoring.utility.apply(relation.utility)
        + TRUST_WEIGHT * scoring.trust.apply(relation.trust)
        + responsiveness_weight * scoring.responsiveness.apply(relation.responsiveness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Transform;

    #[test]
    fn test_linear_score() {
        let scoring = ScoringConfig::uniform(Transform::Linear);
        let rel = RelationVector::new(1.0, 2.0, 2.0, 1.0);
        assert!((priority_score(&scoring, &rel) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_responsiveness_weighs_more() {
        let scoring = ScoringConfig::uniform(Transform::Linear);
        let rel = RelationVector::new(0.0, 0.0, 0.0, -2.0);
        assert!((priority_score(&scoring, &rel) + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_transforms_are_per_dimension() {
        let scoring = ScoringConfig::new(
            Transform::Sigmoid,
            Transform::Linear,
            Transform::Linear,
            Transform::Linear,
        );
        // sigmoid(0) = 5 even for an empty relation
        assert!((priority_score(&scoring, &RelationVector::ZERO) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_higher_trust_scores_higher() {
        let scoring = ScoringConfig::new(
            Transform::Linear,
            Transform::Log,
            Transform::Sigmoid,
            Transform::Linear,
        );
        let low = RelationVector::new(1.0, 1.0, -1.0, 0.0);
        let high = RelationVector::new(1.0, 1.0, 3.0, 0.0);
        assert!(priority_score(&scoring, &high) > priority_score(&scoring, &low));
    }
}
