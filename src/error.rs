//! Crate error types

use crate::analysis::InsightRecord;
use std::fmt;
use thiserror::Error;

/// Pipeline phase a block runs in, used for failure attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Train-time pass (`analyze`)
    Analyze,
    /// Inference-time pass (`explain`)
    Explain,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Analyze => write!(f, "analyze"),
            Phase::Explain => write!(f, "explain"),
        }
    }
}

/// Analysis errors
#[derive(Debug, Error)]
pub enum Error {
    /// A block failed mid-run. `partial` holds the insight record as of the
    /// last block that completed, so the caller decides what to keep.
    #[error("analysis block '{block}' failed during {phase} (position {position}): {source}")]
    Block {
        block: String,
        phase: Phase,
        position: usize,
        #[source]
        source: Box<Error>,
        partial: Box<InsightRecord>,
    },

    #[error("unknown analysis block id: {0}")]
    UnknownBlock(String),

    #[error("invalid configuration for block '{block}': {reason}")]
    BlockConfig { block: String, reason: String },

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column '{0}' holds non-numeric values")]
    NonNumeric(String),

    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("metric {metric} failed: {reason}")]
    Metric { metric: String, reason: String },

    #[error("predictor error: {0}")]
    Predictor(String),

    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, Error>;
