use crate::{action::ActionType, types::Step};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Degenerate amount distribution for {action}: mean={mean}, std={std}")]
    DegenerateAmount { action: ActionType, mean: f64, std: f64 },

    #[error("Invalid distribution parameters: {reason}")]
    Distribution { reason: String },

    #[error("No {kind} available as counterparty")]
    NoCounterparty { kind: &'static str },

    #[error("Run halted after a failure at step {step}")]
    RunHalted { step: Step },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
