//! Probability distribution and divergence errors.

use super::error_code::{self, RulebeamErrorCode};

/// Errors raised by the distribution / KL model.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    #[error("Distributions are over different predicates: {left} vs {right}")]
    PredicateMismatch { left: String, right: String },

    #[error("Distributions are over different databases")]
    DatabaseMismatch,

    #[error("Absolute continuity violated at encoding {encoding}: p={p}, q=0")]
    AbsoluteContinuity { encoding: usize, p: f64 },

    #[error("Prior class mass sums to {sum}, expected 1")]
    PriorMassMismatch { sum: f64 },

    #[error("Predicate {name} is not part of the distribution")]
    MissingPredicate { name: String },

    #[error("Too many predicates for a joint table: {count}")]
    TooManyPredicates { count: usize },

    #[error("Learned divergence {learned} is not below independent divergence {independent}")]
    NoInformationGain { learned: f64, independent: f64 },
}

impl RulebeamErrorCode for DistributionError {
    fn error_code(&self) -> &'static str {
        error_code::DISTRIBUTION_ERROR
    }
}
