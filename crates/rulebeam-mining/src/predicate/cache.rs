//! Bulk predicate evaluation cache.
//!
//! Uses `moka::sync::Cache` keyed by (database identity, canonical name).
//! The cache is bound to one database at a time: the first evaluation
//! against a different database drops every entry. One cache is owned by
//! each mining run and shared by its worker threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use moka::sync::Cache;
use roaring::RoaringBitmap;

use super::{Predicate, PredicateKind};
use crate::database::{Database, DatabaseId};

/// Default maximum cached evaluations.
const DEFAULT_CAPACITY: u64 = 100_000;

/// Concurrent cache of predicate row sets.
pub struct EvaluationCache {
    row_sets: Cache<(DatabaseId, String), Arc<RoaringBitmap>>,
    bound: RwLock<Option<DatabaseId>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            row_sets: Cache::builder().max_capacity(capacity).build(),
            bound: RwLock::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Rows of `database` satisfying `predicate`.
    pub fn evaluate<T>(
        &self,
        predicate: &Predicate<T>,
        database: &Database<T>,
    ) -> Arc<RoaringBitmap> {
        self.bind(database.id());
        self.evaluate_bound(predicate, database)
    }

    /// Number of rows of `database` satisfying `predicate`.
    pub fn count<T>(&self, predicate: &Predicate<T>, database: &Database<T>) -> usize {
        self.evaluate(predicate, database).len() as usize
    }

    fn evaluate_bound<T>(
        &self,
        predicate: &Predicate<T>,
        database: &Database<T>,
    ) -> Arc<RoaringBitmap> {
        let key = (database.id(), predicate.name().to_string());
        if let Some(bits) = self.row_sets.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return bits;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let bits = match predicate.kind() {
            PredicateKind::True => all_rows(database),
            PredicateKind::False | PredicateKind::Undefined => RoaringBitmap::new(),
            PredicateKind::Atomic(test) => (0u32..)
                .zip(database.iter())
                .filter(|&(_, item)| test(item))
                .map(|(row, _)| row)
                .collect(),
            PredicateKind::Not(inner) => {
                all_rows(database) - &*self.evaluate_bound(inner, database)
            }
            PredicateKind::Parentheses(inner) => return self.evaluate_bound(inner, database),
            PredicateKind::And(ops) => ops.iter().fold(all_rows(database), |acc, op| {
                acc & &*self.evaluate_bound(op, database)
            }),
            PredicateKind::Or(ops) => ops.iter().fold(RoaringBitmap::new(), |acc, op| {
                acc | &*self.evaluate_bound(op, database)
            }),
        };

        let bits = Arc::new(bits);
        self.row_sets.insert(key, Arc::clone(&bits));
        bits
    }

    /// Drop all entries when `id` differs from the bound database.
    fn bind(&self, id: DatabaseId) {
        if let Ok(bound) = self.bound.read() {
            if *bound == Some(id) {
                return;
            }
        }
        if let Ok(mut bound) = self.bound.write() {
            if *bound != Some(id) {
                if bound.is_some() {
                    tracing::debug!(previous = ?*bound, next = %id, "evaluation cache rebound");
                }
                self.row_sets.invalidate_all();
                *bound = Some(id);
            }
        }
    }

    /// Database the cache currently holds evaluations for.
    pub fn bound_database(&self) -> Option<DatabaseId> {
        self.bound.read().ok().and_then(|b| *b)
    }

    /// Drop every cached evaluation and unbind the database.
    pub fn clear(&self) {
        self.row_sets.invalidate_all();
        if let Ok(mut bound) = self.bound.write() {
            *bound = None;
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Hit rate (0.0 - 1.0); 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Every row index of `database`.
fn all_rows<T>(database: &Database<T>) -> RoaringBitmap {
    let mut rows = RoaringBitmap::new();
    rows.insert_range(0..database.len() as u32);
    rows
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EvaluationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationCache")
            .field("bound", &self.bound_database())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}
