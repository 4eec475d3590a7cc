//! Engine events, persisted to the event log alongside the ledger.

use crate::types::{RunId, Step};
use serde::{Deserialize, Serialize};

/// Every event emitted by the engine.
/// Variants are only ever appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunInitialized {
        run_id: RunId,
        seed: u64,
        clients: usize,
        merchants: usize,
    },
    StepCompleted {
        step: Step,
        target_count: u64,
        transactions: u64,
        flagged_fraud: u64,
        unauthorized_overdraft: u64,
    },
}

impl SimEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::StepCompleted { .. }  => "step_completed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub step: Step,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
