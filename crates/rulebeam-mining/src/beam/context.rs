//! Per-target search context shared by every beam queue of a target.

use rulebeam_core::config::ObjectiveFunction;
use rulebeam_core::errors::{DistributionError, MiningError};

use super::Node;
use crate::database::Database;
use crate::distribution::{kullback_leibler, Distribution, IndependentDistribution, TableDistribution};
use crate::predicate::{EvaluationCache, Predicate};
use crate::rule::{compare_scores, Rule};

/// Divergences at or below this are treated as zero.
const KL_EPSILON: f64 = 1e-12;

/// Everything an admission decision needs besides the queue itself.
pub struct BeamContext<'a, T> {
    pub database: &'a Database<T>,
    pub cache: &'a EvaluationCache,
    pub target: &'a Predicate<T>,
    pub objective: ObjectiveFunction,
    pub function_delta: f64,
    /// Information check threshold; disabled unless positive.
    pub kl_delta: f64,
}

impl<'a, T> BeamContext<'a, T> {
    /// Score `condition => target`.
    pub fn rule(&self, condition: &Predicate<T>) -> Result<Rule<T>, MiningError> {
        Ok(Rule::evaluate(condition, self.target, self.database, self.cache)?)
    }

    /// Objective of `element` alone as a condition.
    pub fn singleton_score(&self, element: &Predicate<T>) -> Result<f64, MiningError> {
        Ok(self.rule(element)?.objective(self.objective))
    }

    pub fn kl_enabled(&self) -> bool {
        self.kl_delta > 0.0
    }

    /// Whether `child` moves the model towards the data by at least
    /// `kl_delta` of the independent divergence.
    pub fn information_gain(&self, parent: &Node<T>, child: &Node<T>) -> Result<bool, MiningError> {
        let mut atomics = parent.condition().atomics();
        atomics.extend(child.element().atomics());
        atomics.extend(self.target.atomics());
        atomics.sort();
        atomics.dedup();

        let independent = IndependentDistribution::new(atomics.clone(), self.database, self.cache)?;
        let empirical = TableDistribution::empirical(atomics, self.database, self.cache)?;

        let kl_independent = kullback_leibler(&empirical, &independent)?;
        if kl_independent <= KL_EPSILON {
            return Ok(false);
        }
        let kl_parent = kullback_leibler(&empirical, &independent.learn(parent.rule())?)?;
        let kl_rule = kullback_leibler(&empirical, &independent.learn(child.rule())?)?;

        if kl_rule > kl_parent - self.kl_delta * kl_independent {
            return Ok(false);
        }
        if compare_scores(kl_rule, kl_independent).is_ge() {
            return Err(DistributionError::NoInformationGain {
                learned: kl_rule,
                independent: kl_independent,
            }
            .into());
        }
        Ok(true)
    }
}
