//! Independence-assumed joint distribution with lazily memoized entries.

use std::sync::OnceLock;

use rulebeam_core::errors::DistributionError;

use super::{check_predicate_count, Distribution};
use crate::database::{Database, DatabaseId};
use crate::predicate::{EvaluationCache, Predicate};

/// Product of empirical marginal rates, one factor per predicate.
pub struct IndependentDistribution<T> {
    predicates: Vec<Predicate<T>>,
    database_id: DatabaseId,
    database_size: usize,
    marginals: Vec<f64>,
    memo: Vec<OnceLock<f64>>,
}

impl<T> IndependentDistribution<T> {
    pub fn new(
        predicates: Vec<Predicate<T>>,
        database: &Database<T>,
        cache: &EvaluationCache,
    ) -> Result<Self, DistributionError> {
        check_predicate_count(predicates.len())?;
        let n = database.len();
        let marginals = predicates
            .iter()
            .map(|p| {
                if n == 0 {
                    0.0
                } else {
                    cache.count(p, database) as f64 / n as f64
                }
            })
            .collect();
        let memo = (0..1usize << predicates.len()).map(|_| OnceLock::new()).collect();
        Ok(Self {
            predicates,
            database_id: database.id(),
            database_size: n,
            marginals,
            memo,
        })
    }

    /// Empirical rate of `predicates[bit]`.
    pub fn marginal(&self, bit: usize) -> f64 {
        self.marginals[bit]
    }

    fn compute(&self, encoding: usize) -> f64 {
        self.marginals
            .iter()
            .enumerate()
            .map(|(bit, &p)| if encoding >> bit & 1 == 1 { p } else { 1.0 - p })
            .product()
    }
}

impl<T> Distribution<T> for IndependentDistribution<T> {
    fn predicates(&self) -> &[Predicate<T>] {
        &self.predicates
    }

    fn database_id(&self) -> DatabaseId {
        self.database_id
    }

    fn database_size(&self) -> usize {
        self.database_size
    }

    fn probability(&self, encoding: usize) -> f64 {
        match self.memo.get(encoding) {
            Some(cell) => *cell.get_or_init(|| self.compute(encoding)),
            None => 0.0,
        }
    }
}
