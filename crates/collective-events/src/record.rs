//! Interaction records emitted once per agent decision.

use serde::{Deserialize, Serialize};

/// How a single interaction attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Contact happened and went well
    Success,
    /// Contact happened and went badly
    Fail,
    /// The initiator was turned away (or found nobody to approach)
    Refusal,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fail => "fail",
            Outcome::Refusal => "refusal",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent's decision for one interaction round.
///
/// An agent that had no eligible partner is recorded as refusing itself
/// (`from == to`); see [`InteractionRecord::is_abstention`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Tick on which the decision was taken
    pub tick: u64,
    /// Initiating agent
    pub from: String,
    /// Chosen partner
    pub to: String,
    pub outcome: Outcome,
}

impl InteractionRecord {
    pub fn new(tick: u64, from: impl Into<String>, to: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            tick,
            from: from.into(),
            to: to.into(),
            outcome,
        }
    }

    /// Record for an agent that found nobody to approach.
    pub fn abstention(tick: u64, agent: impl Into<String>) -> Self {
        let agent = agent.into();
        Self {
            tick,
            to: agent.clone(),
            from: agent,
            outcome: Outcome::Refusal,
        }
    }

    /// True when the agent abstained instead of approaching someone.
    pub fn is_abstention(&self) -> bool {
        self.from == self.to
    }

    /// Serializes the record as a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a record from a single JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Outcome counts over a batch of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub success: usize,
    pub fail: usize,
    pub refusal: usize,
    /// Refusal records that are abstentions (counted in `refusal` too)
    pub abstained: usize,
}

impl TickSummary {
    pub fn from_records(records: &[InteractionRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.outcome {
                Outcome::Success => summary.success += 1,
                Outcome::Fail => summary.fail += 1,
                Outcome::Refusal => {
                    summary.refusal += 1;
                    if record.is_abstention() {
                        summary.abstained += 1;
                    }
                }
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.success + self.fail + self.refusal
    }
}
