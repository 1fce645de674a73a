//! Beam-search result nodes and their ranking.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rulebeam_core::config::ObjectiveFunction;

use crate::predicate::Predicate;
use crate::rule::{compare_scores, Rule};

/// One scored rule in the derivation forest of a target.
///
/// `element` is the predicate added at this step; for parentless nodes it
/// is the condition itself. Parents are shared and never point forward.
pub struct Node<T> {
    rule: Rule<T>,
    element: Predicate<T>,
    parent: Option<Arc<Node<T>>>,
    score: f64,
    complexity: usize,
}

impl<T> Node<T> {
    /// Parentless node whose element is its condition.
    pub fn seed(rule: Rule<T>, objective: ObjectiveFunction) -> Self {
        let element = rule.condition().clone();
        Self::build(rule, element, None, objective)
    }

    pub fn child(
        rule: Rule<T>,
        element: Predicate<T>,
        parent: Arc<Node<T>>,
        objective: ObjectiveFunction,
    ) -> Self {
        Self::build(rule, element, Some(parent), objective)
    }

    /// Synthetic `TRUE => target` root appended to every result.
    pub fn root(rule: Rule<T>, objective: ObjectiveFunction) -> Self {
        Self::build(rule, Predicate::always_true(), None, objective)
    }

    fn build(
        rule: Rule<T>,
        element: Predicate<T>,
        parent: Option<Arc<Node<T>>>,
        objective: ObjectiveFunction,
    ) -> Self {
        let score = rule.objective(objective);
        let complexity = rule.complexity();
        Self {
            rule,
            element,
            parent,
            score,
            complexity,
        }
    }

    pub fn rule(&self) -> &Rule<T> {
        &self.rule
    }

    pub fn condition(&self) -> &Predicate<T> {
        self.rule.condition()
    }

    pub fn target(&self) -> &Predicate<T> {
        self.rule.target()
    }

    pub fn element(&self) -> &Predicate<T> {
        &self.element
    }

    pub fn parent(&self) -> Option<&Arc<Node<T>>> {
        self.parent.as_ref()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn complexity(&self) -> usize {
        self.complexity
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            depth += 1;
            current = node.parent.as_deref();
        }
        depth
    }
}

/// Best-first order: descending score (NaN last), then ascending complexity.
pub fn rank_cmp<T>(a: &Node<T>, b: &Node<T>) -> Ordering {
    compare_scores(b.score, a.score).then_with(|| a.complexity.cmp(&b.complexity))
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("condition", &self.condition().name())
            .field("element", &self.element.name())
            .field("score", &self.score)
            .field("complexity", &self.complexity)
            .field("parent", &self.parent.as_ref().map(|p| p.condition().name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleCounts;

    fn node(name: &str, atoms: usize, counts: (usize, usize, usize, usize)) -> Node<u8> {
        let atomics: Vec<Predicate<u8>> = (0..atoms)
            .map(|i| Predicate::atomic(format!("{name}{i}"), |_: &u8| true))
            .collect();
        let condition = Predicate::any(atomics);
        let target = Predicate::atomic("t", |_: &u8| true);
        let (n, c, t, i) = counts;
        let rule = Rule::from_counts(condition, target, RuleCounts::new(n, c, t, i).unwrap());
        Node::seed(rule, ObjectiveFunction::Conviction)
    }

    #[test]
    fn test_rank_by_score_then_complexity() {
        let strong = node("a", 2, (100, 30, 30, 30));
        let weak = node("b", 1, (100, 30, 30, 10));
        let simple = node("c", 1, (100, 30, 30, 30));
        assert_eq!(rank_cmp(&strong, &weak), Ordering::Less);
        assert_eq!(rank_cmp(&simple, &strong), Ordering::Less);
        assert_eq!(rank_cmp(&strong, &strong), Ordering::Equal);
    }

    #[test]
    fn test_nan_ranks_last() {
        let target = Predicate::atomic("t", |_: &u8| true);
        let rule = Rule::from_counts(
            Predicate::atomic("a", |_: &u8| true),
            target,
            RuleCounts::new(10, 10, 5, 5).unwrap(),
        );
        let nan = Node::seed(rule, ObjectiveFunction::Correlation);
        assert!(nan.score().is_nan());
        let weak = node("b", 1, (100, 30, 30, 0));
        assert_eq!(rank_cmp(&weak, &nan), Ordering::Less);
    }

    #[test]
    fn test_depth() {
        let parent = Arc::new(node("a", 1, (100, 30, 30, 20)));
        let rule = Rule::from_counts(
            Predicate::atomic("x", |_: &u8| true),
            Predicate::atomic("t", |_: &u8| true),
            RuleCounts::new(100, 30, 30, 30).unwrap(),
        );
        let element = rule.condition().clone();
        let child = Node::child(rule, element, Arc::clone(&parent), ObjectiveFunction::Conviction);
        assert_eq!(parent.depth(), 0);
        assert_eq!(child.depth(), 1);
    }
}
