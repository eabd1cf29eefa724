//! Target Selection
//!
//! Sorts candidates by classification and samples one with a softmax over
//! priority scores.

use rand::Rng;

use crate::archetype::ScoringConfig;
use crate::engine::scoring::priority_score;
use crate::relation::{classify, Classification, RelationVector};

/// Floor applied to archetype temperature before the softmax
pub const MIN_TEMPERATURE: f64 = 0.01;

/// Candidates split by how the chooser classifies them
#[derive(Debug, Clone, PartialEq)]
pub struct Categories<T> {
    pub mandatory: Vec<(T, RelationVector)>,
    pub optional: Vec<(T, RelationVector)>,
    pub avoid: Vec<(T, RelationVector)>,
}

impl<T> Default for Categories<T> {
    fn default() -> Self {
        Self {
            mandatory: Vec::new(),
            optional: Vec::new(),
            avoid: Vec::new(),
        }
    }
}

impl<T> Categories<T> {
    /// Mandatory candidates if there are any, otherwise optional ones
    pub fn pool(&self) -> &[(T, RelationVector)] {
        if self.mandatory.is_empty() {
            &self.optional
        } else {
            &self.mandatory
        }
    }
}

/// Classifies each candidate by the relation toward it. Order is preserved
/// within each category.
pub fn categorize<T, I>(candidates: I) -> Categories<T>
where
    I: IntoIterator<Item = (T, RelationVector)>,
{
    let mut categories = Categories::default();
    for (key, rel) in candidates {
        match classify(&rel) {
            Classification::Mandatory => categories.mandatory.push((key, rel)),
            Classification::Optional => categories.optional.push((key, rel)),
            Classification::Avoid => categories.avoid.push((key, rel)),
        }
    }
    categories
}

/// Numerically stable softmax of `scores / temperature`.
///
/// Temperature is floored at [`MIN_TEMPERATURE`].
pub fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let temperature = temperature.max(MIN_TEMPERATURE);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores
        .iter()
        .map(|s| ((s - max) / temperature).exp())
        .collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Picks a partner from `mandatory`, or from `optional` when there is no
/// mandatory candidate.
///
/// Returns `None` when both are empty. A single candidate is returned
/// without drawing from `rng`.
pub fn choose_target<T, R>(
    scoring: &ScoringConfig,
    temperature: f64,
    mandatory: &[(T, RelationVector)],
    optional: &[(T, RelationVector)],
    rng: &mut R,
) -> Option<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let pool = if mandatory.is_empty() {
        optional
    } else {
        mandatory
    };

    match pool {
        [] => None,
        [(only, _)] => Some(only.clone()),
        _ => {
            let scores: Vec<f64> = pool
                .iter()
                .map(|(_, rel)| priority_score(scoring, rel))
                .collect();
            let probabilities = softmax(&scores, temperature);
            let index = weighted_index(rng, &probabilities);
            Some(pool[index].0.clone())
        }
    }
}

/// Roll-and-subtract selection over `weights`, falling back to the last
/// entry when rounding leaves a remainder.
fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return 0;
    }

    let mut roll: f64 = rng.gen::<f64>() * total;
    for (i, weight) in weights.iter().enumerate() {
        roll -= weight;
        if roll <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}
