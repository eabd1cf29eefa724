//! Execution Backends
//!
//! A backend runs every phase of one tick over a population's agents. The
//! reference backend walks agents one by one; the dense backend keeps the
//! relation graph in a contiguous matrix between ticks and runs per-agent
//! phases in parallel. Both produce identical results for the same seed.

mod dense;
mod reference;

pub use dense::DenseBackend;
pub use reference::ReferenceBackend;

use std::fmt;

use collective_events::InteractionRecord;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId};
use crate::engine::InteractionRules;
use crate::relation::RelationVector;
use crate::rng::TickSeed;

/// Phases of a tick, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    RelationDecay,
    RelationToEmotion,
    EmotionDecay,
    EmotionToRelation,
    Contagion,
    /// Repeated once per interaction round
    InteractionDecisions,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::RelationDecay,
        Phase::RelationToEmotion,
        Phase::EmotionDecay,
        Phase::EmotionToRelation,
        Phase::Contagion,
        Phase::InteractionDecisions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::RelationDecay => "relation_decay",
            Phase::RelationToEmotion => "relation_to_emotion",
            Phase::EmotionDecay => "emotion_decay",
            Phase::EmotionToRelation => "emotion_to_relation",
            Phase::Contagion => "contagion",
            Phase::InteractionDecisions => "interaction_decisions",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a backend needs to run one tick.
///
/// `agents` is sorted by id; `active[i]` says whether `agents[i]` takes part.
pub struct TickContext<'a> {
    pub tick: u64,
    pub seed: TickSeed,
    pub agents: &'a mut [Agent],
    pub active: &'a [bool],
    pub interactions_per_tick: u32,
    pub rules: &'a InteractionRules,
}

/// Strategy for executing a tick
pub trait EngineBackend: Send + Sync + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Runs all phases in order and returns one record per active agent per
    /// interaction round.
    fn run_tick(&mut self, ctx: TickContext<'_>) -> Vec<InteractionRecord>;

    /// Agents were added or removed since the last tick.
    fn membership_changed(&mut self) {}

    /// A relation was stored between ticks. `from` and `to` are slots in
    /// the id-sorted agent list.
    fn relation_set(&mut self, _from: usize, _to: usize, _relation: RelationVector) {}
}

/// Which backend a population runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Reference,
    Dense,
}

impl BackendKind {
    pub fn build(self) -> Box<dyn EngineBackend> {
        match self {
            BackendKind::Reference => Box::new(ReferenceBackend),
            BackendKind::Dense => Box::new(DenseBackend::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Reference => "reference",
            BackendKind::Dense => "dense",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of `id` in an id-sorted agent slice
pub(crate) fn slot_of(agents: &[Agent], id: &AgentId) -> Option<usize> {
    agents.binary_search_by(|agent| agent.id().cmp(id)).ok()
}
