use crate::types::IndividualId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StridegenError {
    #[error("Invalid gene symbol: {0:?}")]
    InvalidGeneSymbol(char),

    #[error("Fitness table incomplete: {recorded} of {expected} individuals recorded")]
    EmptyPopulationFitness { recorded: usize, expected: usize },

    #[error("Dimension mismatch: expected {expected:?} (limbs, length), got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unknown individual: {0}")]
    UnknownIndividual(IndividualId),

    #[error("Generation barrier not reached: {pending} individuals still active")]
    BarrierNotReached { pending: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StridegenError>;
