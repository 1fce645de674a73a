//! Configuration errors.

use super::error_code::{self, RulebeamErrorCode};

/// Errors raised while loading, validating or writing a `RulebeamConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Malformed config in {origin}: {message}")]
    Malformed { origin: String, message: String },

    #[error("Cannot write config as TOML: {message}")]
    Serialize { message: String },

    #[error("Setting {field} {requirement}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
    },

    #[error("Unknown objective function '{value}', expected conviction, loe or correlation")]
    UnknownObjective { value: String },
}

impl RulebeamErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
