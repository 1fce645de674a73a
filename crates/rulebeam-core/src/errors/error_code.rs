//! RulebeamErrorCode trait for structured error reporting.

/// Trait for attaching a stable, machine-readable code to every rulebeam error.
/// Result loggers and visualization front ends key on these codes rather
/// than on the human-readable message.
pub trait RulebeamErrorCode {
    /// Returns the error code string (e.g., "RULE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted report string: `[ERROR_CODE] message`.
    fn report_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PREDICATE_ERROR: &str = "PREDICATE_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const RULE_ERROR: &str = "RULE_ERROR";
pub const DISTRIBUTION_ERROR: &str = "DISTRIBUTION_ERROR";
pub const MINING_ERROR: &str = "MINING_ERROR";
pub const TARGET_PANIC: &str = "TARGET_PANIC";
