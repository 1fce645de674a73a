//! Explicit joint probability table.

use rulebeam_core::errors::DistributionError;

use super::{check_predicate_count, Distribution};
use crate::database::{Database, DatabaseId};
use crate::predicate::{EvaluationCache, Predicate};

/// Joint distribution stored as one probability per encoding.
pub struct TableDistribution<T> {
    predicates: Vec<Predicate<T>>,
    database_id: DatabaseId,
    database_size: usize,
    table: Vec<f64>,
}

impl<T> TableDistribution<T> {
    /// Measured joint distribution: one scan of the rows, `1/n` mass per row.
    pub fn empirical(
        predicates: Vec<Predicate<T>>,
        database: &Database<T>,
        cache: &EvaluationCache,
    ) -> Result<Self, DistributionError> {
        check_predicate_count(predicates.len())?;
        let rows: Vec<_> = predicates.iter().map(|p| cache.evaluate(p, database)).collect();
        let mut table = vec![0.0; 1 << predicates.len()];
        let n = database.len();
        if n > 0 {
            let mass = 1.0 / n as f64;
            for row in 0..n as u32 {
                let encoding = rows
                    .iter()
                    .enumerate()
                    .filter(|(_, bits)| bits.contains(row))
                    .fold(0usize, |acc, (bit, _)| acc | 1 << bit);
                table[encoding] += mass;
            }
        }
        Ok(Self {
            predicates,
            database_id: database.id(),
            database_size: n,
            table,
        })
    }

    /// Wrap precomputed probabilities; missing entries read as zero.
    pub fn from_probabilities(
        predicates: Vec<Predicate<T>>,
        database_id: DatabaseId,
        database_size: usize,
        table: Vec<f64>,
    ) -> Self {
        Self {
            predicates,
            database_id,
            database_size,
            table,
        }
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.table
    }
}

impl<T> Distribution<T> for TableDistribution<T> {
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
        self.table.get(encoding).copied().unwrap_or(0.0)
    }
}
