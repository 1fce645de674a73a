//! Mining orchestrator: per-target beam search on a rayon pool.
//!
//! Each call to [`Miner::mine`] owns a fresh [`EvaluationCache`] shared by
//! all of its targets. Targets run in parallel and fail independently: a
//! target whose search errors or panics yields an empty node list and a
//! [`TargetFailure`]. Inside a target, complexity levels run in order and
//! the candidates of one level are generated and offered in parallel.

pub mod co_occurrence;
pub mod diagnostics;
pub mod report;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use rulebeam_core::config::{MiningConfig, ObjectiveFunction, RulebeamConfig, RuntimeConfig};
use rulebeam_core::errors::{MiningError, PredicateError, RulebeamErrorCode};
use rulebeam_core::events::{
    EventDispatcher, LevelCompletedEvent, MiningCompletedEvent, MiningStartedEvent,
    TargetCompletedEvent, TargetFailedEvent,
};
use rulebeam_core::tracing::metrics;
use rulebeam_core::types::collections::FxHashSet;

use crate::beam::{rank_cmp, BeamContext, BeamQueue, Node};
use crate::database::Database;
use crate::predicate::{EvaluationCache, Injector, Predicate};

pub use co_occurrence::{co_occurrence, CoOccurrence, PairOverlap};
pub use diagnostics::{LevelDiagnostics, MiningDiagnostics};
pub use report::{MiningReport, NodeReport};

/// Why a target produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub error_code: String,
    pub message: String,
}

impl From<&MiningError> for TargetFailure {
    fn from(error: &MiningError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Ranked nodes mined for one target, best first, ending with the
/// synthetic `TRUE => target` root.
pub struct TargetResult<T> {
    pub target: Predicate<T>,
    pub nodes: Vec<Arc<Node<T>>>,
    pub diagnostics: MiningDiagnostics,
    pub co_occurrence: Option<CoOccurrence>,
    pub failure: Option<TargetFailure>,
}

impl<T> TargetResult<T> {
    fn failed(target: &Predicate<T>, error: &MiningError) -> Self {
        Self {
            target: target.clone(),
            nodes: Vec::new(),
            diagnostics: MiningDiagnostics::default(),
            co_occurrence: None,
            failure: Some(TargetFailure::from(error)),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Best mined node, excluding the synthetic root.
    pub fn best(&self) -> Option<&Arc<Node<T>>> {
        self.nodes.first().filter(|node| node.complexity() > 0)
    }

    pub fn report(&self, objective: ObjectiveFunction) -> MiningReport {
        MiningReport::from_result(self, objective)
    }
}

/// Beam-search miner configured once and reusable across runs.
pub struct Miner {
    mining: MiningConfig,
    runtime: RuntimeConfig,
    events: EventDispatcher,
}

impl Miner {
    pub fn new(config: &RulebeamConfig) -> Result<Self, MiningError> {
        RulebeamConfig::validate(config)?;
        Ok(Self {
            mining: config.mining.clone(),
            runtime: config.runtime.clone(),
            events: EventDispatcher::new(),
        })
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &MiningConfig {
        &self.mining
    }

    /// Mine every target against `predicates` over `database`.
    ///
    /// Results are in target order. Fails only when the thread pool
    /// cannot be built.
    pub fn mine<T>(
        &self,
        database: &Database<T>,
        predicates: &[Predicate<T>],
        targets: &[Predicate<T>],
    ) -> Result<Vec<TargetResult<T>>, MiningError>
    where
        T: Send + Sync,
    {
        let started = Instant::now();
        let threads = self.runtime.effective_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("rulebeam-{i}"))
            .build()
            .map_err(|e| MiningError::ThreadPool(e.to_string()))?;
        let cache = EvaluationCache::with_capacity(self.runtime.effective_cache_capacity());

        tracing::info!(
            rows = database.len(),
            predicates = predicates.len(),
            targets = targets.len(),
            threads,
            objective = %self.mining.effective_objective(),
            "mining started"
        );
        self.events.emit_mining_started(&MiningStartedEvent {
            database_size: database.len(),
            predicate_count: predicates.len(),
            target_count: targets.len(),
        });

        let results: Vec<TargetResult<T>> = pool.install(|| {
            targets
                .par_iter()
                .map(|target| self.mine_isolated(database, predicates, target, &cache))
                .collect()
        });

        let failed = results.iter().filter(|r| r.is_failed()).count();
        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            succeeded = results.len() - failed,
            failed,
            duration_ms,
            { metrics::CACHE_HIT_RATE } = cache.hit_rate(),
            "mining completed"
        );
        self.events.emit_mining_completed(&MiningCompletedEvent {
            targets_succeeded: results.len() - failed,
            targets_failed: failed,
            duration_ms,
        });
        Ok(results)
    }

    /// Run one target, turning errors and panics into a failed result.
    fn mine_isolated<T>(
        &self,
        database: &Database<T>,
        predicates: &[Predicate<T>],
        target: &Predicate<T>,
        cache: &EvaluationCache,
    ) -> TargetResult<T>
    where
        T: Send + Sync,
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.mine_target(database, predicates, target, cache)
        }));
        let error = match outcome {
            Ok(Ok(result)) => return result,
            Ok(Err(error)) => error,
            Err(payload) => MiningError::TargetPanic {
                target: target.name().to_string(),
                message: panic_message(payload.as_ref()),
            },
        };

        tracing::error!(
            { metrics::TARGET } = target.name(),
            error_code = error.error_code(),
            error = %error,
            "target mining failed"
        );
        self.events.emit_target_failed(&TargetFailedEvent {
            target: target.name().to_string(),
            error_code: error.error_code().to_string(),
            message: error.to_string(),
        });
        TargetResult::failed(target, &error)
    }

    /// Beam search for a single target.
    pub fn mine_target<T>(
        &self,
        database: &Database<T>,
        predicates: &[Predicate<T>],
        target: &Predicate<T>,
        cache: &EvaluationCache,
    ) -> Result<TargetResult<T>, MiningError>
    where
        T: Send + Sync,
    {
        let span = tracing::info_span!("mine_target", { metrics::TARGET } = target.name());
        let started = Instant::now();
        if !target.is_defined() {
            return Err(PredicateError::Undefined {
                name: target.name().to_string(),
            }
            .into());
        }

        let ctx = BeamContext {
            database,
            cache,
            target,
            objective: self.mining.effective_objective(),
            function_delta: self.mining.effective_function_delta(),
            kl_delta: self.mining.effective_kl_delta(),
        };
        let elements = self.elements(predicates, target)?;
        let injector = Injector::new(self.mining.effective_and(), self.mining.effective_or());
        let max_complexity = self.mining.effective_max_complexity();
        let capacity = self.mining.effective_top_per_complexity();
        let queues: Vec<BeamQueue<T>> =
            (1..=max_complexity).map(|level| BeamQueue::new(level, capacity)).collect();

        let mut levels = Vec::with_capacity(max_complexity);
        for queue in &queues {
            let level = queue.level();
            let candidates = AtomicUsize::new(0);
            if level == 1 {
                elements.par_iter().try_for_each(|element| {
                    let _entered = span.enter();
                    candidates.fetch_add(1, Ordering::Relaxed);
                    let node = Node::seed(ctx.rule(element)?, ctx.objective);
                    let admission = queue.offer(node, &ctx)?;
                    tracing::trace!(condition = element.name(), ?admission, "candidate offered");
                    Ok::<(), MiningError>(())
                })?;
            } else {
                let parents = queues[level - 2].snapshot();
                if parents.is_empty() {
                    break;
                }
                let pairs: Vec<(&Arc<Node<T>>, &Predicate<T>)> = parents
                    .iter()
                    .flat_map(|parent| elements.iter().map(move |element| (parent, element)))
                    .filter(|(parent, element)| !parent.condition().shares_atomics_with(element))
                    .collect();
                pairs.par_iter().try_for_each(|&(parent, element)| {
                    let _entered = span.enter();
                    for condition in injector.inject(parent.condition(), element) {
                        if condition.complexity() != level {
                            continue;
                        }
                        candidates.fetch_add(1, Ordering::Relaxed);
                        let node = Node::child(
                            ctx.rule(&condition)?,
                            element.clone(),
                            Arc::clone(parent),
                            ctx.objective,
                        );
                        let admission = queue.offer(node, &ctx)?;
                        tracing::trace!(condition = condition.name(), ?admission, "candidate offered");
                    }
                    Ok::<(), MiningError>(())
                })?;
            }

            let diagnostics = LevelDiagnostics {
                level,
                candidates: candidates.into_inner(),
                retained: queue.len(),
                stats: queue.stats(),
            };
            span.in_scope(|| {
                tracing::info!(
                    { metrics::LEVEL } = level,
                    { metrics::CANDIDATES } = diagnostics.candidates,
                    { metrics::ADMITTED } = diagnostics.stats.admitted,
                    retained = diagnostics.retained,
                    "level completed"
                );
                tracing::debug!({ metrics::LEVEL } = level, stats = ?diagnostics.stats, "admission summary");
            });
            self.events.emit_level_completed(&LevelCompletedEvent {
                target: target.name().to_string(),
                level,
                candidates: diagnostics.candidates,
                admitted: diagnostics.stats.admitted,
                retained: diagnostics.retained,
            });
            levels.push(diagnostics);
        }

        let mut nodes: Vec<Arc<Node<T>>> = queues.iter().flat_map(|q| q.snapshot()).collect();
        nodes.sort_by(|a, b| rank_cmp(a, b));

        let co_occurrence = if self.mining.effective_upset() {
            Some(co_occurrence(&nodes, self.runtime.effective_upset_top(), database, cache)?)
        } else {
            None
        };

        let root = Node::root(ctx.rule(&Predicate::always_true())?, ctx.objective);
        nodes.push(Arc::new(root));

        let duration_ms = started.elapsed().as_millis() as u64;
        let best_condition = nodes.first().map(|n| n.condition().name().to_string());
        span.in_scope(|| {
            tracing::info!(
                nodes = nodes.len(),
                best = best_condition.as_deref().unwrap_or(""),
                { metrics::TARGET_DURATION } = duration_ms,
                "target completed"
            );
        });
        self.events.emit_target_completed(&TargetCompletedEvent {
            target: target.name().to_string(),
            node_count: nodes.len(),
            best_condition,
            duration_ms,
        });

        Ok(TargetResult {
            target: target.clone(),
            nodes,
            diagnostics: MiningDiagnostics {
                levels,
                duration_ms,
                cache_hit_rate: cache.hit_rate(),
            },
            co_occurrence,
            failure: None,
        })
    }

    /// Single-atomic predicates not touching `target`, plus their
    /// negations when enabled. Duplicates are dropped by canonical name.
    pub fn elements<T>(
        &self,
        predicates: &[Predicate<T>],
        target: &Predicate<T>,
    ) -> Result<Vec<Predicate<T>>, MiningError> {
        let negate = self.mining.effective_negate();
        let mut seen = FxHashSet::default();
        let mut elements = Vec::with_capacity(predicates.len() * 2);
        for predicate in predicates {
            if predicate.complexity() != 1
                || !predicate.is_defined()
                || predicate.shares_atomics_with(target)
            {
                continue;
            }
            if seen.insert(predicate.name().to_string()) {
                elements.push(predicate.clone());
            }
            if negate && predicate.can_negate() {
                let negation = predicate.not()?;
                if negation.is_defined() && seen.insert(negation.name().to_string()) {
                    elements.push(negation);
                }
            }
        }
        Ok(elements)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
