//! Joint probability model over an ordered predicate list.
//!
//! An encoding is a bit vector with bit `j` set when `predicates[j]` holds,
//! so a distribution over `n` predicates has `2^n` entries. Two models are
//! provided: [`IndependentDistribution`], which multiplies empirical
//! marginals lazily, and [`TableDistribution`], an explicit table built from
//! the data or by [`Distribution::learn`].

pub mod independent;
pub mod table;

use rulebeam_core::errors::DistributionError;
use rulebeam_core::types::collections::FxHashMap;

use crate::database::DatabaseId;
use crate::predicate::Predicate;
use crate::rule::Rule;

pub use independent::IndependentDistribution;
pub use table::TableDistribution;

/// Largest predicate list a joint table may cover.
pub const MAX_PREDICATES: usize = 24;

/// Class masses must sum to one within this tolerance before learning.
pub const PRIOR_MASS_TOLERANCE: f64 = 1e-10;

/// Largest `P(e)` tolerated where `Q(e) == 0`.
pub const CONTINUITY_TOLERANCE: f64 = 1e-6;

/// Joint probability over the encodings of a predicate list.
pub trait Distribution<T> {
    /// Predicates in bit order.
    fn predicates(&self) -> &[Predicate<T>];

    fn database_id(&self) -> DatabaseId;

    fn database_size(&self) -> usize;

    fn probability(&self, encoding: usize) -> f64;

    /// Number of encodings.
    fn len(&self) -> usize {
        1 << self.predicates().len()
    }

    fn is_empty(&self) -> bool {
        false
    }

    /// Shannon entropy in bits.
    fn entropy(&self) -> f64 {
        (0..self.len())
            .map(|e| self.probability(e))
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.log2())
            .sum()
    }

    /// Rescale the mass of the four confusion classes of `rule` to the rule's
    /// exact proportions, keeping the relative shape inside each class.
    fn learn(&self, rule: &Rule<T>) -> Result<TableDistribution<T>, DistributionError> {
        let predicates = self.predicates();
        let index: FxHashMap<&str, usize> = predicates
            .iter()
            .enumerate()
            .map(|(bit, p)| (p.name(), bit))
            .collect();
        for atomic in rule.condition().atomics().iter().chain(&rule.target().atomics()) {
            if !index.contains_key(atomic.name()) {
                return Err(DistributionError::MissingPredicate {
                    name: atomic.name().to_string(),
                });
            }
        }

        let len = self.len();
        let mut classes = Vec::with_capacity(len);
        let mut prior = [0.0f64; 4];
        let mut members = [0usize; 4];
        for encoding in 0..len {
            let assign = |p: &Predicate<T>| index.get(p.name()).map(|&bit| encoding >> bit & 1 == 1);
            let condition = rule.condition().evaluate_with(&assign).unwrap_or(false);
            let target = rule.target().evaluate_with(&assign).unwrap_or(false);
            let class = confusion_class(condition, target);
            prior[class] += self.probability(encoding);
            members[class] += 1;
            classes.push(class);
        }

        let sum: f64 = prior.iter().sum();
        if (sum - 1.0).abs() > PRIOR_MASS_TOLERANCE {
            return Err(DistributionError::PriorMassMismatch { sum });
        }

        let counts = rule.counts();
        let n = counts.database().max(1) as f64;
        let proportions = [
            counts.intersection() as f64 / n,
            counts.error_type1() as f64 / n,
            counts.error_type2() as f64 / n,
            counts.neither() as f64 / n,
        ];

        let table = classes
            .iter()
            .enumerate()
            .map(|(encoding, &class)| {
                if prior[class] > 0.0 {
                    self.probability(encoding) * proportions[class] / prior[class]
                } else {
                    proportions[class] / members[class] as f64
                }
            })
            .collect();

        Ok(TableDistribution::from_probabilities(
            predicates.to_vec(),
            self.database_id(),
            self.database_size(),
            table,
        ))
    }
}

/// Index of the confusion class: condition and target, condition only,
/// target only, neither.
fn confusion_class(condition: bool, target: bool) -> usize {
    match (condition, target) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    }
}

/// Kullback-Leibler divergence `KL(P || Q)` in bits, clamped at zero.
pub fn kullback_leibler<T, P, Q>(p: &P, q: &Q) -> Result<f64, DistributionError>
where
    P: Distribution<T> + ?Sized,
    Q: Distribution<T> + ?Sized,
{
    if p.predicates() != q.predicates() {
        return Err(DistributionError::PredicateMismatch {
            left: joined_names(p.predicates()),
            right: joined_names(q.predicates()),
        });
    }
    if p.database_id() != q.database_id() {
        return Err(DistributionError::DatabaseMismatch);
    }

    let mut divergence = 0.0;
    for encoding in 0..p.len() {
        let pe = p.probability(encoding);
        if pe <= 0.0 {
            continue;
        }
        let qe = q.probability(encoding);
        if qe <= 0.0 {
            if pe > CONTINUITY_TOLERANCE {
                return Err(DistributionError::AbsoluteContinuity { encoding, p: pe });
            }
            continue;
        }
        divergence += pe * (pe / qe).log2();
    }
    Ok(divergence.max(0.0))
}

pub(crate) fn check_predicate_count(count: usize) -> Result<(), DistributionError> {
    if count > MAX_PREDICATES {
        return Err(DistributionError::TooManyPredicates { count });
    }
    Ok(())
}

fn joined_names<T>(predicates: &[Predicate<T>]) -> String {
    predicates
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}
