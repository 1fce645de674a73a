//! Top-level rulebeam configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{MiningConfig, ObjectiveFunction, RuntimeConfig};
use crate::errors::ConfigError;

/// Project config file name looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "rulebeam.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (applied via `apply_overrides`)
/// 2. Environment variables (`RULEBEAM_*`)
/// 3. Project config (`rulebeam.toml` in project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulebeamConfig {
    pub mining: MiningConfig,
    pub runtime: RuntimeConfig,
}

/// Override arguments supplied by the embedding application.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_complexity: Option<usize>,
    pub top_per_complexity: Option<usize>,
    pub objective: Option<ObjectiveFunction>,
    pub function_delta: Option<f64>,
    pub kl_delta: Option<f64>,
    pub threads: Option<usize>,
}

impl RulebeamConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config)?;

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Malformed {
            origin: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &RulebeamConfig) -> Result<(), ConfigError> {
        let mining = &config.mining;
        if mining.max_complexity == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "mining.max_complexity",
                requirement: "must be at least 1",
            });
        }
        if mining.top_per_complexity == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "mining.top_per_complexity",
                requirement: "must be at least 1",
            });
        }
        if let Some(delta) = mining.function_delta {
            if !delta.is_finite() || delta < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "mining.function_delta",
                    requirement: "must be a finite value >= 0.0",
                });
            }
        }
        if let Some(delta) = mining.kl_delta {
            if delta > 1.0 || delta.is_nan() {
                return Err(ConfigError::OutOfRange {
                    field: "mining.kl_delta",
                    requirement: "must be <= 1.0 (negative disables the check)",
                });
            }
        }
        if mining.effective_max_complexity() > 1 && !mining.effective_and() && !mining.effective_or() {
            return Err(ConfigError::OutOfRange {
                field: "mining.and",
                requirement: "or mining.or must be enabled above complexity 1",
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut RulebeamConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_config: RulebeamConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Malformed {
                origin: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut RulebeamConfig, other: &RulebeamConfig) {
        let (b, o) = (&mut base.mining, &other.mining);
        if o.max_complexity.is_some() {
            b.max_complexity = o.max_complexity;
        }
        if o.top_per_complexity.is_some() {
            b.top_per_complexity = o.top_per_complexity;
        }
        if o.objective.is_some() {
            b.objective = o.objective;
        }
        if o.function_delta.is_some() {
            b.function_delta = o.function_delta;
        }
        if o.kl_delta.is_some() {
            b.kl_delta = o.kl_delta;
        }
        if o.negate.is_some() {
            b.negate = o.negate;
        }
        if o.combine_and.is_some() {
            b.combine_and = o.combine_and;
        }
        if o.combine_or.is_some() {
            b.combine_or = o.combine_or;
        }
        if o.upset.is_some() {
            b.upset = o.upset;
        }

        let (b, o) = (&mut base.runtime, &other.runtime);
        if o.threads.is_some() {
            b.threads = o.threads;
        }
        if o.cache_capacity.is_some() {
            b.cache_capacity = o.cache_capacity;
        }
        if o.upset_top.is_some() {
            b.upset_top = o.upset_top;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `RULEBEAM_MAX_COMPLEXITY`, `RULEBEAM_OBJECTIVE`, etc.
    /// Unparseable numeric values are ignored; an unknown objective is an error.
    fn apply_env_overrides(config: &mut RulebeamConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("RULEBEAM_MAX_COMPLEXITY") {
            if let Ok(v) = val.parse::<usize>() {
                config.mining.max_complexity = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RULEBEAM_TOP_PER_COMPLEXITY") {
            if let Ok(v) = val.parse::<usize>() {
                config.mining.top_per_complexity = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RULEBEAM_OBJECTIVE") {
            config.mining.objective = Some(val.parse()?);
        }
        if let Ok(val) = std::env::var("RULEBEAM_FUNCTION_DELTA") {
            if let Ok(v) = val.parse::<f64>() {
                config.mining.function_delta = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RULEBEAM_KL_DELTA") {
            if let Ok(v) = val.parse::<f64>() {
                config.mining.kl_delta = Some(v);
            }
        }
        if let Ok(val) = std::env::var("RULEBEAM_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.runtime.threads = Some(v);
            }
        }
        Ok(())
    }

    /// Apply programmatic overrides (highest priority).
    fn apply_overrides(config: &mut RulebeamConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.max_complexity {
            config.mining.max_complexity = Some(v);
        }
        if let Some(v) = overrides.top_per_complexity {
            config.mining.top_per_complexity = Some(v);
        }
        if let Some(v) = overrides.objective {
            config.mining.objective = Some(v);
        }
        if let Some(v) = overrides.function_delta {
            config.mining.function_delta = Some(v);
        }
        if let Some(v) = overrides.kl_delta {
            config.mining.kl_delta = Some(v);
        }
        if let Some(v) = overrides.threads {
            config.runtime.threads = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}
