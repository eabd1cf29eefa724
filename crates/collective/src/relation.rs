//! Relation Model
//!
//! Directed four-dimensional view of one agent toward another, and the fixed
//! classification that gates who is worth approaching.

use serde::{Deserialize, Serialize};

/// Lower bound of every relation scalar
pub const RELATION_MIN: f64 = -10.0;
/// Upper bound of every relation scalar
pub const RELATION_MAX: f64 = 10.0;

/// Classification thresholds. Fixed for every archetype.
pub mod thresholds {
    /// Responsiveness below this is always avoided
    pub const AVOID_RESPONSIVENESS: f64 = -6.0;
    /// Trust at or above this (with affinity) makes contact mandatory
    pub const MANDATORY_TRUST: f64 = 5.0;
    pub const MANDATORY_AFFINITY: f64 = 4.0;
    /// Lower floors for optional contact
    pub const OPTIONAL_TRUST: f64 = -2.0;
    pub const OPTIONAL_AFFINITY: f64 = -2.0;
    /// Optional contact requires responsiveness strictly above this
    pub const OPTIONAL_RESPONSIVENESS: f64 = -5.0;
}

/// One dimension of a [`RelationVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDim {
    Utility,
    Affinity,
    Trust,
    Responsiveness,
}

impl RelationDim {
    pub const ALL: [RelationDim; 4] = [
        RelationDim::Utility,
        RelationDim::Affinity,
        RelationDim::Trust,
        RelationDim::Responsiveness,
    ];
}

/// How one agent regards another.
///
/// Every scalar stays within [-10, 10]. The zero vector stands for an absent
/// relation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelationVector {
    /// How useful the other agent is
    pub utility: f64,
    /// How much the other agent is liked
    pub affinity: f64,
    /// How reliable the other agent seems
    pub trust: f64,
    /// Willingness to engage; gates refusal and classification
    pub responsiveness: f64,
}

impl RelationVector {
    pub const ZERO: RelationVector = RelationVector {
        utility: 0.0,
        affinity: 0.0,
        trust: 0.0,
        responsiveness: 0.0,
    };

    pub fn new(utility: f64, affinity: f64, trust: f64, responsiveness: f64) -> Self {
        Self {
            utility: bound(0.0, utility),
            affinity: bound(0.0, affinity),
            trust: bound(0.0, trust),
            responsiveness: bound(0.0, responsiveness),
        }
    }

    pub fn get(&self, dim: RelationDim) -> f64 {
        match dim {
            RelationDim::Utility => self.utility,
            RelationDim::Affinity => self.affinity,
            RelationDim::Trust => self.trust,
            RelationDim::Responsiveness => self.responsiveness,
        }
    }

    fn slot(&mut self, dim: RelationDim) -> &mut f64 {
        match dim {
            RelationDim::Utility => &mut self.utility,
            RelationDim::Affinity => &mut self.affinity,
            RelationDim::Trust => &mut self.trust,
            RelationDim::Responsiveness => &mut self.responsiveness,
        }
    }

    /// Adds `delta` to one dimension with clamping
    pub fn adjust(&mut self, dim: RelationDim, delta: f64) {
        let slot = self.slot(dim);
        *slot = bound(*slot, *slot + delta);
    }

    /// Sets one dimension with clamping
    pub fn set(&mut self, dim: RelationDim, value: f64) {
        let slot = self.slot(dim);
        *slot = bound(*slot, value);
    }

    pub fn adjust_utility(&mut self, delta: f64) {
        self.adjust(RelationDim::Utility, delta);
    }

    pub fn adjust_affinity(&mut self, delta: f64) {
        self.adjust(RelationDim::Affinity, delta);
    }

    pub fn adjust_trust(&mut self, delta: f64) {
        self.adjust(RelationDim::Trust, delta);
    }

    pub fn adjust_responsiveness(&mut self, delta: f64) {
        self.adjust(RelationDim::Responsiveness, delta);
    }

    /// Mean of utility, affinity and trust
    pub fn warmth(&self) -> f64 {
        (self.affinity + self.trust + self.utility) / 3.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn is_within_bounds(&self) -> bool {
        RelationDim::ALL
            .iter()
            .all(|&d| (RELATION_MIN..=RELATION_MAX).contains(&self.get(d)))
    }
}

/// Clamps `next` into the relation bounds, keeping `current` if `next` is NaN.
fn bound(current: f64, next: f64) -> f64 {
    if next.is_nan() {
        current
    } else {
        next.clamp(RELATION_MIN, RELATION_MAX)
    }
}

/// Interaction eligibility derived from a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Preferred partners; chosen from before anyone optional
    Mandatory,
    /// Acceptable partners
    Optional,
    /// Never approached
    Avoid,
}

/// Classifies a relation against the fixed thresholds.
pub fn classify(relation: &RelationVector) -> Classification {
    use thresholds::*;

    if relation.responsiveness < AVOID_RESPONSIVENESS {
        return Classification::Avoid;
    }
    if relation.trust >= MANDATORY_TRUST
        && relation.affinity >= MANDATORY_AFFINITY
        && relation.responsiveness >= 0.0
    {
        return Classification::Mandatory;
    }
    if relation.trust >= OPTIONAL_TRUST
        && relation.affinity >= OPTIONAL_AFFINITY
        && relation.responsiveness > OPTIONAL_RESPONSIVENESS
    {
        return Classification::Optional;
    }
    Classification::Avoid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let rel = RelationVector::new(12.0, -15.0, 3.0, 0.0);
        assert_eq!(rel.utility, RELATION_MAX);
        assert_eq!(rel.affinity, RELATION_MIN);
        assert_eq!(rel.trust, 3.0);
        assert!(rel.is_within_bounds());
    }

    #[test]
    fn test_adjust_clamps_and_ignores_nan() {
        let mut rel = RelationVector::ZERO;
        rel.adjust_trust(7.0);
        rel.adjust_trust(7.0);
        assert_eq!(rel.trust, RELATION_MAX);

        rel.adjust_trust(f64::NAN);
        assert_eq!(rel.trust, RELATION_MAX);

        rel.set(RelationDim::Responsiveness, -40.0);
        assert_eq!(rel.responsiveness, RELATION_MIN);
    }

    #[test]
    fn test_zero_vector_is_optional() {
        assert_eq!(classify(&RelationVector::ZERO), Classification::Optional);
    }

    #[test]
    fn test_classification_thresholds() {
        let close = RelationVector::new(0.0, 4.0, 5.0, 0.0);
        assert_eq!(classify(&close), Classification::Mandatory);

        // Mandatory requires non-negative responsiveness
        let cold_friend = RelationVector::new(0.0, 4.0, 5.0, -0.5);
        assert_eq!(classify(&cold_friend), Classification::Optional);

        let ignored = RelationVector::new(0.0, 9.0, 9.0, -6.5);
        assert_eq!(classify(&ignored), Classification::Avoid);

        let distrusted = RelationVector::new(0.0, 1.0, -2.5, 0.0);
        assert_eq!(classify(&distrusted), Classification::Avoid);

        let unresponsive = RelationVector::new(0.0, 1.0, 1.0, -5.0);
        assert_eq!(classify(&unresponsive), Classification::Avoid);
    }

    #[test]
    fn test_classification_is_pure() {
        let rel = RelationVector::new(2.0, -1.0, 1.0, 0.3);
        let first = classify(&rel);
        for _ in 0..10 {
            assert_eq!(classify(&rel.clone()), first);
        }
    }

    #[test]
    fn test_warmth() {
        let rel = RelationVector::new(3.0, 6.0, -3.0, 9.0);
        assert!((rel.warmth() - 2.0).abs() < 1e-12);
    }
}
