//! Shared record and snapshot types for the emotion collective.
//!
//! This crate contains pure data structures with no simulation logic.
//! Logging and presentation layers depend on it to consume what the
//! engine produces without linking the engine itself.

pub mod record;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export record types
pub use record::{InteractionRecord, Outcome, TickSummary};

// Re-export snapshot types
pub use snapshot::{AgentSnapshot, PopulationSnapshot, RelationSnapshot};
