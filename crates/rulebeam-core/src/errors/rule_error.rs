//! Rule construction errors.

use super::error_code::{self, RulebeamErrorCode};

/// Errors that can occur while building a rule from raw counts.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error(
        "Invalid rule counts: database={database}, condition={condition}, target={target}, intersection={intersection}"
    )]
    InvalidCounts {
        database: usize,
        condition: usize,
        target: usize,
        intersection: usize,
    },
}

impl RulebeamErrorCode for RuleError {
    fn error_code(&self) -> &'static str {
        error_code::RULE_ERROR
    }
}
