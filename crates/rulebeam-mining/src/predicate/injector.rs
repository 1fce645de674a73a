//! Predicate injection: every structural way to add one predicate to a
//! condition tree.
//!
//! At each visited node the element is combined from outside (AND and/or
//! OR). Junction nodes are then descended: each operand is replaced in turn
//! by each of its own variants while its siblings stay fixed. Parentheses
//! are transparent. `NOT` subtrees and leaves are only wrapped from outside.

use rulebeam_core::types::collections::{FxHashSet, SmallVec2};

use super::{Junction, Predicate, PredicateKind};

/// Structural mutation of condition trees.
#[derive(Debug, Clone, Copy)]
pub struct Injector {
    combine_and: bool,
    combine_or: bool,
}

impl Injector {
    pub fn new(combine_and: bool, combine_or: bool) -> Self {
        Self {
            combine_and,
            combine_or,
        }
    }

    /// Distinct, defined trees combining `element` into `condition`.
    ///
    /// Order follows the visit order (root first), with later duplicates
    /// dropped.
    pub fn inject<T>(&self, condition: &Predicate<T>, element: &Predicate<T>) -> Vec<Predicate<T>> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        self.variants(condition, element)
            .into_iter()
            .filter(|candidate| candidate.is_defined())
            .filter(|candidate| seen.insert(candidate.name().to_string()))
            .collect()
    }

    fn variants<T>(&self, node: &Predicate<T>, element: &Predicate<T>) -> Vec<Predicate<T>> {
        let (junction, operands) = match node.kind() {
            PredicateKind::Parentheses(inner) => return self.variants(inner, element),
            PredicateKind::And(ops) => (Junction::And, ops),
            PredicateKind::Or(ops) => (Junction::Or, ops),
            _ => return self.wrap(node, element).into_vec(),
        };

        let mut out = self.wrap(node, element).into_vec();
        for (i, operand) in operands.iter().enumerate() {
            for variant in self.variants(operand, element) {
                let mut replaced = node.operand_vec();
                replaced[i] = variant;
                out.push(Predicate::junction(junction, replaced));
            }
        }
        out
    }

    fn wrap<T>(&self, node: &Predicate<T>, element: &Predicate<T>) -> SmallVec2<Predicate<T>> {
        let mut out = SmallVec2::new();
        if self.combine_and {
            out.push(node.and(element));
        }
        if self.combine_or {
            out.push(node.or(element));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Predicate<u8> {
        Predicate::atomic(name, |_: &u8| true)
    }

    fn names(preds: &[Predicate<u8>]) -> Vec<String> {
        let mut out: Vec<String> = preds.iter().map(|p| p.name().to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_inject_into_disjunction() {
        let (a, b, x) = (p("A"), p("B"), p("X"));
        let result = Injector::new(true, true).inject(&a.or(&b), &x);
        let expected = vec![
            a.or(&b).and(&x),
            a.and(&x).or(&b),
            a.or(&b.and(&x)),
            a.or(&b).or(&x),
        ];
        assert_eq!(result.len(), 4);
        assert_eq!(names(&result), names(&expected));
    }

    #[test]
    fn test_inject_into_leaf() {
        let (a, x) = (p("A"), p("X"));
        let result = Injector::new(true, true).inject(&a, &x);
        assert_eq!(names(&result), vec!["A AND X", "A OR X"]);
        let only_or = Injector::new(false, true).inject(&a, &x);
        assert_eq!(names(&only_or), vec!["A OR X"]);
    }

    #[test]
    fn test_negation_is_opaque() {
        let (a, b, x) = (p("A"), p("B"), p("X"));
        let negated = a.and(&b).not().unwrap();
        let result = Injector::new(true, true).inject(&negated, &x);
        assert_eq!(
            names(&result),
            vec!["NOT (A AND B) AND X", "NOT (A AND B) OR X"]
        );
    }

    #[test]
    fn test_nested_tree() {
        let (a, b, c, x) = (p("A"), p("B"), p("C"), p("X"));
        // (A AND B) OR C
        let tree = a.and(&b).or(&c);
        let result = Injector::new(true, false).inject(&tree, &x);
        assert_eq!(
            names(&result),
            names(&[
                tree.and(&x),
                a.and(&b).and(&x).or(&c),
                a.and(&b).or(&c.and(&x)),
            ])
        );
    }

    #[test]
    fn test_undefined_variants_dropped() {
        let a = p("A");
        let not_a = a.not().unwrap();
        let result = Injector::new(true, true).inject(&a, &not_a);
        assert!(result.is_empty());
    }
}
