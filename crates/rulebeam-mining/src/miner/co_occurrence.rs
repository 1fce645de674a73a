//! Pairwise overlap of the best single-predicate conditions.

use std::sync::Arc;

use serde::Serialize;

use rulebeam_core::errors::MiningError;

use crate::beam::Node;
use crate::database::Database;
use crate::predicate::EvaluationCache;
use crate::rule::RuleCounts;

/// Overlap of two conditions, indexed into [`CoOccurrence::conditions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairOverlap {
    pub left: usize,
    pub right: usize,
    pub intersection: usize,
    /// Phi coefficient; NaN serializes as `null`.
    pub correlation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoOccurrence {
    pub conditions: Vec<String>,
    /// Row count of each condition.
    pub sizes: Vec<usize>,
    pub pairs: Vec<PairOverlap>,
}

/// Overlap statistics over the first `top` complexity-1 nodes of `nodes`.
pub fn co_occurrence<T>(
    nodes: &[Arc<Node<T>>],
    top: usize,
    database: &Database<T>,
    cache: &EvaluationCache,
) -> Result<CoOccurrence, MiningError> {
    let singles: Vec<&Arc<Node<T>>> = nodes
        .iter()
        .filter(|node| node.complexity() == 1)
        .take(top)
        .collect();
    let rows: Vec<_> = singles
        .iter()
        .map(|node| cache.evaluate(node.condition(), database))
        .collect();

    let mut pairs = Vec::new();
    for left in 0..rows.len() {
        for right in left + 1..rows.len() {
            let intersection = rows[left].intersection_len(&rows[right]) as usize;
            let counts = RuleCounts::new(
                database.len(),
                rows[left].len() as usize,
                rows[right].len() as usize,
                intersection,
            )?;
            pairs.push(PairOverlap {
                left,
                right,
                intersection,
                correlation: counts.correlation(),
            });
        }
    }

    Ok(CoOccurrence {
        conditions: singles.iter().map(|n| n.condition().name().to_string()).collect(),
        sizes: rows.iter().map(|r| r.len() as usize).collect(),
        pairs,
    })
}
