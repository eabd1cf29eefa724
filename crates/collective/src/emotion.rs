//! Emotion Model
//!
//! Seven opposing-pair axes, each bounded to [-3, 3].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower bound of every emotion axis
pub const EMOTION_MIN: f64 = -3.0;
/// Upper bound of every emotion axis
pub const EMOTION_MAX: f64 = 3.0;

/// Opposing-pair emotion axes.
///
/// Positive values are the constructive pole (joy, calm, humility,
/// acceptance, surprise, confidence, openness); negative values the other
/// one. `AngerHumility = -2.0` is angry, `FearCalm = -2.0` is afraid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionAxis {
    JoySadness,
    FearCalm,
    AngerHumility,
    DisgustAcceptance,
    SurpriseHabit,
    ShameConfidence,
    OpennessAlienation,
}

impl EmotionAxis {
    pub const COUNT: usize = 7;

    /// All axes in serialization order
    pub const ALL: [EmotionAxis; Self::COUNT] = [
        EmotionAxis::JoySadness,
        EmotionAxis::FearCalm,
        EmotionAxis::AngerHumility,
        EmotionAxis::DisgustAcceptance,
        EmotionAxis::SurpriseHabit,
        EmotionAxis::ShameConfidence,
        EmotionAxis::OpennessAlienation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionAxis::JoySadness => "joy_sadness",
            EmotionAxis::FearCalm => "fear_calm",
            EmotionAxis::AngerHumility => "anger_humility",
            EmotionAxis::DisgustAcceptance => "disgust_acceptance",
            EmotionAxis::SurpriseHabit => "surprise_habit",
            EmotionAxis::ShameConfidence => "shame_confidence",
            EmotionAxis::OpennessAlienation => "openness_alienation",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for EmotionAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `f64` per emotion axis.
///
/// Used for emotion values, archetype weights and coefficients. Every field
/// is required when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisValues {
    pub joy_sadness: f64,
    pub fear_calm: f64,
    pub anger_humility: f64,
    pub disgust_acceptance: f64,
    pub surprise_habit: f64,
    pub shame_confidence: f64,
    pub openness_alienation: f64,
}

impl AxisValues {
    /// Same value on every axis
    pub const fn splat(value: f64) -> Self {
        Self {
            joy_sadness: value,
            fear_calm: value,
            anger_humility: value,
            disgust_acceptance: value,
            surprise_habit: value,
            shame_confidence: value,
            openness_alienation: value,
        }
    }

    /// Builds from an array in [`EmotionAxis::ALL`] order.
    pub const fn from_array(values: [f64; EmotionAxis::COUNT]) -> Self {
        Self {
            joy_sadness: values[0],
            fear_calm: values[1],
            anger_humility: values[2],
            disgust_acceptance: values[3],
            surprise_habit: values[4],
            shame_confidence: values[5],
            openness_alienation: values[6],
        }
    }

    pub fn get(&self, axis: EmotionAxis) -> f64 {
        match axis {
            EmotionAxis::JoySadness => self.joy_sadness,
            EmotionAxis::FearCalm => self.fear_calm,
            EmotionAxis::AngerHumility => self.anger_humility,
            EmotionAxis::DisgustAcceptance => self.disgust_acceptance,
            EmotionAxis::SurpriseHabit => self.surprise_habit,
            EmotionAxis::ShameConfidence => self.shame_confidence,
            EmotionAxis::OpennessAlienation => self.openness_alienation,
        }
    }

    pub fn get_mut(&mut self, axis: EmotionAxis) -> &mut f64 {
        match axis {
            EmotionAxis::JoySadness => &mut self.joy_sadness,
            EmotionAxis::FearCalm => &mut self.fear_calm,
            EmotionAxis::AngerHumility => &mut self.anger_humility,
            EmotionAxis::DisgustAcceptance => &mut self.disgust_acceptance,
            EmotionAxis::SurpriseHabit => &mut self.surprise_habit,
            EmotionAxis::ShameConfidence => &mut self.shame_confidence,
            EmotionAxis::OpennessAlienation => &mut self.openness_alienation,
        }
    }

    /// (axis, value) pairs in axis order
    pub fn iter(&self) -> impl Iterator<Item = (EmotionAxis, f64)> + '_ {
        EmotionAxis::ALL.iter().map(move |&axis| (axis, self.get(axis)))
    }

    pub fn is_finite(&self) -> bool {
        self.iter().all(|(_, v)| v.is_finite())
    }
}

/// Coarse description of an axis value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    VeryNegative,
    Negative,
    SlightlyNegative,
    Neutral,
    SlightlyPositive,
    Positive,
    VeryPositive,
}

impl Intensity {
    pub fn from_value(value: f64) -> Self {
        match value.round() as i64 {
            i64::MIN..=-3 => Intensity::VeryNegative,
            -2 => Intensity::Negative,
            -1 => Intensity::SlightlyNegative,
            0 => Intensity::Neutral,
            1 => Intensity::SlightlyPositive,
            2 => Intensity::Positive,
            _ => Intensity::VeryPositive,
        }
    }
}

/// Bounded emotional state of one agent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionState {
    values: AxisValues,
}

impl EmotionState {
    /// All axes at zero
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: EmotionAxis) -> f64 {
        self.values.get(axis)
    }

    pub fn values(&self) -> &AxisValues {
        &self.values
    }

    /// Applies `raw_delta * weights[axis]`, clamped to the axis bounds.
    pub fn adjust(&mut self, axis: EmotionAxis, raw_delta: f64, weights: &AxisValues) {
        let slot = self.values.get_mut(axis);
        let next = *slot + raw_delta * weights.get(axis);
        if next.is_nan() {
            return;
        }
        *slot = next.clamp(EMOTION_MIN, EMOTION_MAX);
    }

    /// Sets an axis directly, bypassing archetype weighting.
    pub fn set(&mut self, axis: EmotionAxis, value: f64) {
        if value.is_nan() {
            return;
        }
        *self.values.get_mut(axis) = value.clamp(EMOTION_MIN, EMOTION_MAX);
    }

    /// Moves every axis toward zero by `rate` without crossing it.
    pub fn decay(&mut self, rate: f64) {
        let rate = rate.max(0.0);
        for axis in EmotionAxis::ALL {
            let slot = self.values.get_mut(axis);
            *slot = decay_toward_zero(*slot, rate, rate);
        }
    }

    /// Axis with the greatest magnitude; ties are broken uniformly at random.
    ///
    /// Returns `None` when every axis is zero.
    pub fn primary<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(EmotionAxis, f64)> {
        let max_abs = self
            .values
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max);
        if max_abs == 0.0 {
            return None;
        }

        let candidates: Vec<(EmotionAxis, f64)> = self
            .values
            .iter()
            .filter(|(_, v)| v.abs() == max_abs)
            .collect();
        candidates.choose(rng).copied()
    }

    /// Sum of unsigned values across all axes
    pub fn total_intensity(&self) -> f64 {
        self.values.iter().map(|(_, v)| v.abs()).sum()
    }

    pub fn describe(&self, axis: EmotionAxis) -> Intensity {
        Intensity::from_value(self.get(axis))
    }

    pub fn is_neutral(&self) -> bool {
        self.values.iter().all(|(_, v)| v == 0.0)
    }
}

/// Pulls `value` toward zero: positive values shrink by `down`, negative
/// values grow by `up`. Never crosses zero.
pub(crate) fn decay_toward_zero(value: f64, down: f64, up: f64) -> f64 {
    if value > 0.0 {
        (value - down).max(0.0)
    } else if value < 0.0 {
        (value + up).min(0.0)
    } else {
        value
    }
}
