//! Emotion Collective Engine
//!
//! Simulates a population of agents with bounded emotions and directed
//! relations. Each tick runs, in order: relation decay, relation-to-emotion
//! feedback, emotion decay, emotion-to-relation feedback, contagion and one
//! or more interaction rounds.
//!
//! ```ignore
//! use collective::{AgentId, Population, RelationVector};
//!
//! let mut population = Population::new(42);
//! population.add_agent("a", "Harmony", 1.0, &[])?;
//! population.add_agent("b", "Harmony", 1.0, &[])?;
//! population.set_relation(&"a".into(), &"b".into(), RelationVector::new(2.0, -1.0, 1.0, 0.0))?;
//!
//! let records = population.run_tick(1);
//! ```

pub mod agent;
pub mod archetype;
pub mod backend;
pub mod config;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod external;
pub mod population;
pub mod relation;
pub mod rng;

pub use agent::{Agent, AgentId, AgentSpec};
pub use archetype::{Archetype, ArchetypeRegistry, ArchetypeSpec, ScoringConfig, Transform};
pub use backend::{BackendKind, EngineBackend, Phase};
pub use config::{default_config_toml, SimConfig};
pub use emotion::{AxisValues, EmotionAxis, EmotionState, Intensity};
pub use engine::{
    choose_target, priority_score, process_interaction_result, process_refusal,
    refusal_probability, EdgePair, InteractionRules,
};
pub use error::{ArchetypeError, ConfigError, PopulationError};
pub use external::{ExternalActor, Player};
pub use population::Population;
pub use relation::{classify, Classification, RelationVector};
pub use rng::SimRng;

pub use collective_events::{InteractionRecord, Outcome, PopulationSnapshot, TickSummary};
