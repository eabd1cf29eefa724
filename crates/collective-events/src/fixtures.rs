//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers:
//!
//! ```ignore
//! // [dev-dependencies]
//! // collective-events = { path = "../collective-events", features = ["test-fixtures"] }
//!
//! use collective_events::fixtures;
//!
//! let records = fixtures::sample_records();
//! let snapshot = fixtures::sample_snapshot();
//! ```

use crate::{InteractionRecord, PopulationSnapshot};

/// Returns sample records from the fixtures file.
///
/// Two ticks of a three-agent population, one decision per agent per tick,
/// including one abstention.
pub fn sample_records() -> Vec<InteractionRecord> {
    let jsonl = include_str!("../tests/fixtures/sample_records.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            InteractionRecord::from_jsonl(l).unwrap_or_else(|e| {
                panic!("Failed to parse record line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// Returns a sample population snapshot from the fixtures file.
pub fn sample_snapshot() -> PopulationSnapshot {
    let json = include_str!("../tests/fixtures/sample_snapshot.json");
    serde_json::from_str(json).expect("Failed to parse sample_snapshot.json")
}

/// Records belonging to a single tick.
pub fn records_for_tick(tick: u64) -> Vec<InteractionRecord> {
    sample_records()
        .into_iter()
        .filter(|r| r.tick == tick)
        .collect()
}
