//! Mining run errors.
//! Aggregates subsystem errors via `From` conversions.

use super::error_code::{self, RulebeamErrorCode};
use super::{ConfigError, DistributionError, PredicateError, RuleError};

/// Errors that abort the mining run of a single target.
#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    #[error("Predicate error: {0}")]
    Predicate(#[from] PredicateError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mining of target {target} panicked: {message}")]
    TargetPanic { target: String, message: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl RulebeamErrorCode for MiningError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Predicate(e) => e.error_code(),
            Self::Rule(e) => e.error_code(),
            Self::Distribution(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::TargetPanic { .. } => error_code::TARGET_PANIC,
            Self::ThreadPool(_) => error_code::MINING_ERROR,
        }
    }
}
