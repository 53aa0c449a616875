use std::fmt;

use thiserror::Error;

/// Pipeline stage that ran out of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Normalize => f.write_str("normalization"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("insufficient data for {stage}: need at least {needed} points, got {got}")]
    InsufficientData {
        stage: Stage,
        needed: usize,
        got: usize,
    },
    #[error("unresolved well: {0}")]
    UnresolvedWell(String),
    #[error("no optimization possible: {0}")]
    NoOptimization(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("plate {barcode} not available: {reason}")]
    PlateUnavailable { barcode: String, reason: String },
    #[error("scheduler error: {0}")]
    Scheduler(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
