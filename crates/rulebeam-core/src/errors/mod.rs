//! Error handling for rulebeam.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod distribution_error;
pub mod error_code;
pub mod mining_error;
pub mod predicate_error;
pub mod rule_error;

pub use config_error::ConfigError;
pub use distribution_error::DistributionError;
pub use error_code::RulebeamErrorCode;
pub use mining_error::MiningError;
pub use predicate_error::{ParseError, PredicateError};
pub use rule_error::RuleError;
