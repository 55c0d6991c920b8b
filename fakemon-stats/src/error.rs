//! Error types for sampling, the stage engine and configuration loading.
use thiserror::Error;

use crate::stat::Stat;

/// Failures raised while sampling or driving the stage chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatError {
    #[error("stat increment must be greater than zero")]
    ZeroIncrement,
    #[error("no multiple of {increment} fits inside {min}..={max}")]
    EmptyUnitRange { min: u32, max: u32, increment: u32 },
    #[error("stage {stage} is outside 1..={num_stages}")]
    StageOutOfRange { stage: u8, num_stages: u8 },
}

/// Errors raised when generator configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("stat increment must be greater than zero")]
    ZeroIncrement,
    #[error("stat increment must be between 1 and {max} (got {value})")]
    IncrementOutOfRange { value: u32, max: u32 },
    #[error("stage count must be between 1 and {max} (got {value})")]
    StageCountOutOfRange { value: u8, max: u8 },
    #[error("stage {stage} {stat} range is inverted ({min} > {max})")]
    InvertedRange {
        stage: u8,
        stat: Stat,
        min: u32,
        max: u32,
    },
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

