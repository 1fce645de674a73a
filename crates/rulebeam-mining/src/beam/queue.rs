//! Bounded per-level beam with admission control.
//!
//! Offers run concurrently. The parent-delta checks are evaluated without
//! holding the lock; deduplication and capacity enforcement happen under it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use rulebeam_core::errors::MiningError;

use super::{rank_cmp, BeamContext, Node};
use crate::rule::compare_scores;

/// Why an offered node was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// A member with the same condition has a better parent.
    WorseParent,
    /// The element alone scores above the parent.
    ElementDominates,
    /// Score gain over the parent below `function_delta`.
    InsufficientGain,
    /// Divergence reduction below `kl_delta`.
    NoInformationGain,
    /// Queue full and the node does not beat the worst member.
    Capacity,
}

impl Rejection {
    pub const ALL: [Rejection; 5] = [
        Self::WorseParent,
        Self::ElementDominates,
        Self::InsufficientGain,
        Self::NoInformationGain,
        Self::Capacity,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::WorseParent => "worse_parent",
            Self::ElementDominates => "element_dominates",
            Self::InsufficientGain => "insufficient_gain",
            Self::NoInformationGain => "no_information_gain",
            Self::Capacity => "capacity",
        }
    }
}

/// Outcome of [`BeamQueue::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Admitted in place of a member with the same condition.
    Replaced,
    Rejected(Rejection),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Counter snapshot of one queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub offers: usize,
    pub admitted: usize,
    pub replaced: usize,
    pub rejected: [usize; 5],
}

impl QueueStats {
    pub fn rejected(&self, reason: Rejection) -> usize {
        self.rejected[reason.index()]
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.iter().sum()
    }
}

/// Heap entry ordered so that the worst node is the maximum.
struct Ranked<T>(Arc<Node<T>>);

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_cmp(&self.0, &other.0)
    }
}

/// Top-`capacity` nodes of one complexity level.
pub struct BeamQueue<T> {
    level: usize,
    capacity: usize,
    heap: Mutex<BinaryHeap<Ranked<T>>>,
    offers: AtomicUsize,
    admitted: AtomicUsize,
    replaced: AtomicUsize,
    rejected: [AtomicUsize; 5],
}

impl<T> BeamQueue<T> {
    pub fn new(level: usize, capacity: usize) -> Self {
        Self {
            level,
            capacity,
            heap: Mutex::new(BinaryHeap::with_capacity(capacity + 1)),
            offers: AtomicUsize::new(0),
            admitted: AtomicUsize::new(0),
            replaced: AtomicUsize::new(0),
            rejected: Default::default(),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to admit `node`.
    ///
    /// Errors only on broken invariants while scoring or measuring
    /// divergence; ordinary refusals are `Admission::Rejected`.
    pub fn offer(&self, node: Node<T>, ctx: &BeamContext<'_, T>) -> Result<Admission, MiningError> {
        self.offers.fetch_add(1, AtomicOrdering::Relaxed);
        let admission = self.admit(node, ctx)?;
        match admission {
            Admission::Admitted => {
                self.admitted.fetch_add(1, AtomicOrdering::Relaxed);
            }
            Admission::Replaced => {
                self.admitted.fetch_add(1, AtomicOrdering::Relaxed);
                self.replaced.fetch_add(1, AtomicOrdering::Relaxed);
            }
            Admission::Rejected(reason) => {
                self.rejected[reason.index()].fetch_add(1, AtomicOrdering::Relaxed);
            }
        }
        Ok(admission)
    }

    fn admit(&self, node: Node<T>, ctx: &BeamContext<'_, T>) -> Result<Admission, MiningError> {
        if self.has_better_duplicate(&self.lock(), &node) {
            return Ok(Admission::Rejected(Rejection::WorseParent));
        }

        if let Some(parent) = node.parent() {
            let singleton = ctx.singleton_score(node.element())?;
            if compare_scores(singleton, parent.score()) == Ordering::Greater {
                return Ok(Admission::Rejected(Rejection::ElementDominates));
            }
            let required = parent.score() + ctx.function_delta;
            if compare_scores(node.score(), required) == Ordering::Less {
                return Ok(Admission::Rejected(Rejection::InsufficientGain));
            }
            if ctx.kl_enabled() && !ctx.information_gain(parent, &node)? {
                return Ok(Admission::Rejected(Rejection::NoInformationGain));
            }
        }

        let mut heap = self.lock();
        if self.has_better_duplicate(&heap, &node) {
            return Ok(Admission::Rejected(Rejection::WorseParent));
        }
        let condition = node.condition().clone();
        let before = heap.len();
        heap.retain(|member| member.0.condition() != &condition);
        if heap.len() < before {
            heap.push(Ranked(Arc::new(node)));
            return Ok(Admission::Replaced);
        }

        if heap.len() >= self.capacity {
            let beats_worst = heap
                .peek()
                .map_or(true, |worst| rank_cmp(&node, &worst.0) == Ordering::Less);
            if !beats_worst {
                return Ok(Admission::Rejected(Rejection::Capacity));
            }
            heap.pop();
        }
        heap.push(Ranked(Arc::new(node)));
        Ok(Admission::Admitted)
    }

    /// A member shares the condition and its parent ranks strictly better.
    fn has_better_duplicate(&self, heap: &BinaryHeap<Ranked<T>>, node: &Node<T>) -> bool {
        heap.iter()
            .find(|member| member.0.condition() == node.condition())
            .is_some_and(|member| match (node.parent(), member.0.parent()) {
                (Some(incoming), Some(existing)) => rank_cmp(incoming, existing) == Ordering::Greater,
                _ => false,
            })
    }

    /// Members ordered best first.
    pub fn snapshot(&self) -> Vec<Arc<Node<T>>> {
        let mut members: Vec<Arc<Node<T>>> =
            self.lock().iter().map(|ranked| Arc::clone(&ranked.0)).collect();
        members.sort_by(|a, b| rank_cmp(a, b));
        members
    }

    pub fn stats(&self) -> QueueStats {
        let mut rejected = [0; 5];
        for (slot, counter) in rejected.iter_mut().zip(&self.rejected) {
            *slot = counter.load(AtomicOrdering::Relaxed);
        }
        QueueStats {
            offers: self.offers.load(AtomicOrdering::Relaxed),
            admitted: self.admitted.load(AtomicOrdering::Relaxed),
            replaced: self.replaced.load(AtomicOrdering::Relaxed),
            rejected,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BinaryHeap<Ranked<T>>> {
        // A poisoned heap still holds only fully inserted nodes.
        self.heap.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> fmt::Debug for BeamQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeamQueue")
            .field("level", &self.level)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::predicate::range::range;
    use crate::predicate::{EvaluationCache, Predicate};
    use rulebeam_core::config::ObjectiveFunction;

    struct Fixture {
        db: Database<i64>,
        cache: EvaluationCache,
        target: Predicate<i64>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: (0..100).collect(),
                cache: EvaluationCache::new(),
                target: range(20, 50),
            }
        }

        fn ctx(&self) -> BeamContext<'_, i64> {
            BeamContext {
                database: &self.db,
                cache: &self.cache,
                target: &self.target,
                objective: ObjectiveFunction::Conviction,
                function_delta: 0.0,
                kl_delta: -1.0,
            }
        }

        fn seed(&self, condition: &Predicate<i64>) -> Node<i64> {
            let ctx = self.ctx();
            Node::seed(ctx.rule(condition).unwrap(), ctx.objective)
        }

        fn child(&self, parent: &Arc<Node<i64>>, element: &Predicate<i64>, condition: &Predicate<i64>) -> Node<i64> {
            let ctx = self.ctx();
            Node::child(ctx.rule(condition).unwrap(), element.clone(), Arc::clone(parent), ctx.objective)
        }
    }

    #[test]
    fn test_capacity_keeps_best() {
        let fx = Fixture::new();
        let queue = BeamQueue::new(1, 2);
        for lo in (0..100).step_by(10) {
            queue.offer(fx.seed(&range(lo, lo + 10)), &fx.ctx()).unwrap();
        }
        let members = queue.snapshot();
        assert_eq!(members.len(), 2);
        for member in &members {
            assert!((member.score() - 7.0).abs() < 1e-9);
        }
        let stats = queue.stats();
        assert_eq!(stats.offers, 10);
        assert_eq!(stats.admitted + stats.total_rejected(), 10);
    }

    #[test]
    fn test_element_dominating_parent_rejected() {
        let fx = Fixture::new();
        let weak_parent = Arc::new(fx.seed(&range(60, 70)));
        let strong = range(20, 30);
        let child = fx.child(&weak_parent, &strong, &range(60, 70).or(&strong));
        let queue = BeamQueue::new(2, 10);
        let admission = queue.offer(child, &fx.ctx()).unwrap();
        assert_eq!(admission, Admission::Rejected(Rejection::ElementDominates));
        assert!(queue.is_empty());
        assert_eq!(queue.stats().rejected(Rejection::ElementDominates), 1);
    }

    #[test]
    fn test_kl_gate_rejects_child_without_information_gain() {
        let fx = Fixture::new();
        let parent = Arc::new(fx.seed(&range(20, 30)));
        let element = range(30, 40);
        let condition = range(20, 30).or(&element);

        let strict = BeamContext { kl_delta: 1.0, ..fx.ctx() };
        let queue = BeamQueue::new(2, 10);
        let admission = queue.offer(fx.child(&parent, &element, &condition), &strict).unwrap();
        assert_eq!(admission, Admission::Rejected(Rejection::NoInformationGain));
        assert!(queue.is_empty());
        assert_eq!(queue.stats().rejected(Rejection::NoInformationGain), 1);

        let lenient = BeamContext { kl_delta: 0.1, ..fx.ctx() };
        let admission = queue.offer(fx.child(&parent, &element, &condition), &lenient).unwrap();
        assert_eq!(admission, Admission::Admitted);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_function_delta() {
        let fx = Fixture::new();
        let parent = Arc::new(fx.seed(&range(20, 30)));
        let element = range(30, 40);
        let condition = range(20, 30).or(&element);
        let queue = BeamQueue::new(2, 10);

        let mut ctx = fx.ctx();
        ctx.function_delta = 100.0;
        let admission = queue.offer(fx.child(&parent, &element, &condition), &ctx).unwrap();
        assert_eq!(admission, Admission::Rejected(Rejection::InsufficientGain));

        let admission = queue.offer(fx.child(&parent, &element, &condition), &fx.ctx()).unwrap();
        assert_eq!(admission, Admission::Admitted);
    }

    #[test]
    fn test_same_condition_prefers_better_parent() {
        let fx = Fixture::new();
        let a = range(20, 30);
        let b = range(30, 40);
        let good_parent = Arc::new(fx.seed(&a));
        let bad_parent = Arc::new(fx.seed(&a.or(&range(90, 100))));
        let condition = a.or(&b);
        let queue = BeamQueue::new(2, 10);

        let first = queue.offer(fx.child(&good_parent, &b, &condition), &fx.ctx()).unwrap();
        assert_eq!(first, Admission::Admitted);

        // Same condition reached from a worse parent.
        let worse = fx.child(&bad_parent, &b, &condition);
        assert_eq!(
            queue.admit(worse, &fx.ctx()).unwrap(),
            Admission::Rejected(Rejection::WorseParent)
        );

        let again = queue.offer(fx.child(&good_parent, &b, &condition), &fx.ctx()).unwrap();
        assert_eq!(again, Admission::Replaced);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_snapshot_sorted() {
        let fx = Fixture::new();
        let queue = BeamQueue::new(1, 5);
        for lo in [0, 20, 40, 45, 60] {
            queue.offer(fx.seed(&range(lo, lo + 10)), &fx.ctx()).unwrap();
        }
        let scores: Vec<f64> = queue.snapshot().iter().map(|n| n.score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
