//! Objective functions as pure functions of rule counts.

use std::cmp::Ordering;

use rulebeam_core::config::ObjectiveFunction;

use super::RuleCounts;

/// Scoring of rule counts by a configured objective.
pub trait Objective {
    fn score(&self, counts: &RuleCounts) -> f64;
}

impl Objective for ObjectiveFunction {
    fn score(&self, counts: &RuleCounts) -> f64 {
        match self {
            ObjectiveFunction::Conviction => counts.conviction(),
            ObjectiveFunction::Loe => counts.loe(),
            ObjectiveFunction::Correlation => counts.correlation(),
        }
    }
}

/// Total order on scores with NaN below every number.
pub fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.total_cmp(&b),
    }
}
