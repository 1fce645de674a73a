//! Configuration system for rulebeam.
//! TOML-based, layered resolution: overrides > env > project > defaults.

pub mod mining_config;
pub mod objective;
pub mod rulebeam_config;
pub mod runtime_config;

pub use mining_config::MiningConfig;
pub use objective::ObjectiveFunction;
pub use rulebeam_config::{ConfigOverrides, RulebeamConfig};
pub use runtime_config::RuntimeConfig;
