//! Serializable view of a target's result forest.

use std::sync::Arc;

use serde::Serialize;

use rulebeam_core::config::ObjectiveFunction;
use rulebeam_core::types::collections::FxHashMap;

use super::{CoOccurrence, MiningDiagnostics, TargetFailure, TargetResult};
use crate::beam::Node;
use crate::rule::{RuleCounts, RuleStatistics};

/// One node of the flat ranked list.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub rank: usize,
    pub condition: String,
    pub target: String,
    pub element: String,
    /// Rank of the parent node in the same list.
    pub parent: Option<usize>,
    pub complexity: usize,
    pub score: f64,
    pub counts: RuleCounts,
    pub statistics: RuleStatistics,
}

/// Everything mined for one target.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    pub target: String,
    pub objective: ObjectiveFunction,
    pub nodes: Vec<NodeReport>,
    pub diagnostics: MiningDiagnostics,
    pub co_occurrence: Option<CoOccurrence>,
    pub failure: Option<TargetFailure>,
}

impl MiningReport {
    pub fn from_result<T>(result: &TargetResult<T>, objective: ObjectiveFunction) -> Self {
        let ranks: FxHashMap<*const Node<T>, usize> = result
            .nodes
            .iter()
            .enumerate()
            .map(|(rank, node)| (Arc::as_ptr(node), rank))
            .collect();

        let nodes = result
            .nodes
            .iter()
            .enumerate()
            .map(|(rank, node)| NodeReport {
                rank,
                condition: node.condition().name().to_string(),
                target: node.target().name().to_string(),
                element: node.element().name().to_string(),
                parent: node
                    .parent()
                    .and_then(|parent| ranks.get(&Arc::as_ptr(parent)).copied()),
                complexity: node.complexity(),
                score: node.score(),
                counts: *node.rule().counts(),
                statistics: node.rule().statistics(),
            })
            .collect();

        Self {
            target: result.target.name().to_string(),
            objective,
            nodes,
            diagnostics: result.diagnostics.clone(),
            co_occurrence: result.co_occurrence.clone(),
            failure: result.failure.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
