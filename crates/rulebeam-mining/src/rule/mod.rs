//! Rules `condition ⇒ target` evaluated against a database.

pub mod counts;
pub mod objective;

use std::fmt;

use rulebeam_core::config::ObjectiveFunction;
use rulebeam_core::errors::RuleError;

use crate::database::Database;
use crate::predicate::{EvaluationCache, Predicate};

pub use counts::{RuleCounts, RuleStatistics};
pub use objective::{compare_scores, Objective};

/// A condition/target pair with its counts over one database.
pub struct Rule<T> {
    condition: Predicate<T>,
    target: Predicate<T>,
    counts: RuleCounts,
}

impl<T> Rule<T> {
    /// Count `condition`, `target` and their intersection over `database`.
    pub fn evaluate(
        condition: &Predicate<T>,
        target: &Predicate<T>,
        database: &Database<T>,
        cache: &EvaluationCache,
    ) -> Result<Self, RuleError> {
        let condition_rows = cache.evaluate(condition, database);
        let target_rows = cache.evaluate(target, database);
        let counts = RuleCounts::new(
            database.len(),
            condition_rows.len() as usize,
            target_rows.len() as usize,
            condition_rows.intersection_len(&target_rows) as usize,
        )?;
        Ok(Self::from_counts(condition.clone(), target.clone(), counts))
    }

    pub fn from_counts(condition: Predicate<T>, target: Predicate<T>, counts: RuleCounts) -> Self {
        Self {
            condition,
            target,
            counts,
        }
    }

    pub fn condition(&self) -> &Predicate<T> {
        &self.condition
    }

    pub fn target(&self) -> &Predicate<T> {
        &self.target
    }

    pub fn counts(&self) -> &RuleCounts {
        &self.counts
    }

    pub fn objective(&self, objective: ObjectiveFunction) -> f64 {
        objective.score(&self.counts)
    }

    pub fn statistics(&self) -> RuleStatistics {
        self.counts.statistics()
    }

    /// Complexity of the condition.
    pub fn complexity(&self) -> usize {
        self.condition.complexity()
    }
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            target: self.target.clone(),
            counts: self.counts,
        }
    }
}

impl<T> fmt::Display for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.condition, self.target)
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("condition", &self.condition.name())
            .field("target", &self.target.name())
            .field("counts", &self.counts)
            .finish()
    }
}
