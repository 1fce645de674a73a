//! Predicate algebra and name-grammar errors.

use super::error_code::{self, RulebeamErrorCode};

/// Errors raised by predicate operations.
#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    #[error("Predicate cannot be negated: {name}")]
    NotNegatable { name: String },

    #[error("Predicate is undefined: {name}")]
    Undefined { name: String },
}

impl RulebeamErrorCode for PredicateError {
    fn error_code(&self) -> &'static str {
        error_code::PREDICATE_ERROR
    }
}

/// Errors raised while parsing a canonical predicate name.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected end of input in {input:?}")]
    UnexpectedEnd { input: String },

    #[error("Unknown predicate at offset {offset} in {input:?}")]
    UnknownPredicate { input: String, offset: usize },

    #[error("Unbalanced parentheses at offset {offset} in {input:?}")]
    UnbalancedParentheses { input: String, offset: usize },

    #[error("AND and OR mixed without parentheses at offset {offset} in {input:?}")]
    MixedOperators { input: String, offset: usize },

    #[error("Trailing input at offset {offset} in {input:?}")]
    TrailingInput { input: String, offset: usize },

    #[error("Invalid predicate {input:?}: {source}")]
    Predicate {
        input: String,
        #[source]
        source: PredicateError,
    },
}

impl RulebeamErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        error_code::PARSE_ERROR
    }
}
