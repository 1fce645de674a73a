//! Beam-search configuration.

use serde::{Deserialize, Serialize};

use super::ObjectiveFunction;

/// Configuration for the rule-mining beam search.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MiningConfig {
    /// Maximum number of distinct atomics in a condition. Default: 3.
    pub max_complexity: Option<usize>,
    /// Beam width per complexity level. Default: 10.
    pub top_per_complexity: Option<usize>,
    /// Ranking statistic. Default: conviction.
    pub objective: Option<ObjectiveFunction>,
    /// Minimum objective gain of a child over its parent. Default: 0.0.
    pub function_delta: Option<f64>,
    /// Required fraction of KL reduction per step; negative disables. Default: -1.0.
    pub kl_delta: Option<f64>,
    /// Also mine negated predicates. Default: true.
    pub negate: Option<bool>,
    /// Allow AND combinations. Default: true.
    #[serde(rename = "and")]
    pub combine_and: Option<bool>,
    /// Allow OR combinations. Default: true.
    #[serde(rename = "or")]
    pub combine_or: Option<bool>,
    /// Compute co-occurrence statistics over top singleton rules. Default: false.
    pub upset: Option<bool>,
}

impl MiningConfig {
    pub fn effective_max_complexity(&self) -> usize {
        self.max_complexity.unwrap_or(3)
    }

    pub fn effective_top_per_complexity(&self) -> usize {
        self.top_per_complexity.unwrap_or(10)
    }

    pub fn effective_objective(&self) -> ObjectiveFunction {
        self.objective.unwrap_or_default()
    }

    pub fn effective_function_delta(&self) -> f64 {
        self.function_delta.unwrap_or(0.0)
    }

    pub fn effective_kl_delta(&self) -> f64 {
        self.kl_delta.unwrap_or(-1.0)
    }

    /// True when the KL information check participates in admission.
    pub fn kl_check_enabled(&self) -> bool {
        self.effective_kl_delta() > 0.0
    }

    pub fn effective_negate(&self) -> bool {
        self.negate.unwrap_or(true)
    }

    pub fn effective_and(&self) -> bool {
        self.combine_and.unwrap_or(true)
    }

    pub fn effective_or(&self) -> bool {
        self.combine_or.unwrap_or(true)
    }

    pub fn effective_upset(&self) -> bool {
        self.upset.unwrap_or(false)
    }
}
