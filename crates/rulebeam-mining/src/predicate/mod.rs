//! Predicate algebra: immutable boolean expression trees over items.
//!
//! Predicates are built through smart constructors that normalize as they
//! go: nested same-kind junctions are flattened, identity elements dropped,
//! absorbing elements short-circuit, duplicate operands removed, and the
//! remaining operands sorted by canonical name. Two predicates are equal
//! exactly when their canonical names are equal.
//!
//! `Undefined` marks a meaningless combination. It is absorbing under every
//! constructor and is filtered out by the injector rather than raised as an
//! error.

pub mod cache;
pub mod injector;
pub mod parser;
pub mod range;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rulebeam_core::errors::PredicateError;
use rulebeam_core::types::collections::{FxHashSet, SmallVec4};

pub use cache::EvaluationCache;
pub use injector::Injector;
pub use parser::PredicateParser;

pub const TRUE_NAME: &str = "TRUE";
pub const FALSE_NAME: &str = "FALSE";
pub const UNDEFINED_NAME: &str = "UNDEFINED";
pub const NOT_KEYWORD: &str = "NOT";
pub const AND_KEYWORD: &str = "AND";
pub const OR_KEYWORD: &str = "OR";

/// Leaf test over a single item.
pub type AtomicTest<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Boolean junction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => AND_KEYWORD,
            Self::Or => OR_KEYWORD,
        }
    }
}

/// Shape of a predicate tree node.
pub enum PredicateKind<T> {
    True,
    False,
    Undefined,
    Atomic(AtomicTest<T>),
    Not(Predicate<T>),
    Parentheses(Predicate<T>),
    And(Vec<Predicate<T>>),
    Or(Vec<Predicate<T>>),
}

struct PredicateNode<T> {
    name: String,
    kind: PredicateKind<T>,
    defined: bool,
    can_negate: bool,
}

/// Immutable, cheaply clonable boolean predicate over items of type `T`.
pub struct Predicate<T> {
    node: Arc<PredicateNode<T>>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T> Predicate<T> {
    fn from_parts(name: String, kind: PredicateKind<T>, defined: bool, can_negate: bool) -> Self {
        Self {
            node: Arc::new(PredicateNode {
                name,
                kind,
                defined,
                can_negate,
            }),
        }
    }

    /// Negatable leaf predicate.
    pub fn atomic<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::atomic_with(name, true, test)
    }

    /// Leaf predicate with an explicit negation capability.
    pub fn atomic_with<F>(name: impl Into<String>, can_negate: bool, test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_parts(name.into(), PredicateKind::Atomic(Arc::new(test)), true, can_negate)
    }

    pub fn always_true() -> Self {
        Self::from_parts(TRUE_NAME.to_string(), PredicateKind::True, true, true)
    }

    pub fn always_false() -> Self {
        Self::from_parts(FALSE_NAME.to_string(), PredicateKind::False, true, true)
    }

    pub fn undefined() -> Self {
        Self::from_parts(UNDEFINED_NAME.to_string(), PredicateKind::Undefined, false, true)
    }

    /// Canonical name; also the predicate's identity.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn kind(&self) -> &PredicateKind<T> {
        &self.node.kind
    }

    pub fn is_defined(&self) -> bool {
        self.node.defined
    }

    pub fn can_negate(&self) -> bool {
        self.node.can_negate
    }

    pub fn is_true(&self) -> bool {
        matches!(self.node.kind, PredicateKind::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self.node.kind, PredicateKind::False)
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.node.kind, PredicateKind::Atomic(_))
    }

    /// The predicate with any enclosing parentheses removed.
    pub fn unparenthesized(&self) -> &Predicate<T> {
        match &self.node.kind {
            PredicateKind::Parentheses(inner) => inner.unparenthesized(),
            _ => self,
        }
    }

    /// Logical negation.
    ///
    /// Double negation cancels, `TRUE` and `FALSE` swap, and `Undefined`
    /// stays undefined. Fails when the predicate cannot be negated.
    pub fn not(&self) -> Result<Predicate<T>, PredicateError> {
        if !self.can_negate() {
            return Err(PredicateError::NotNegatable {
                name: self.name().to_string(),
            });
        }
        let negated = match &self.node.kind {
            PredicateKind::Undefined => self.clone(),
            PredicateKind::True => Self::always_false(),
            PredicateKind::False => Self::always_true(),
            PredicateKind::Not(inner) => inner.unparenthesized().clone(),
            PredicateKind::Atomic(_) | PredicateKind::Parentheses(_) => Self::negation(self.clone()),
            PredicateKind::And(_) | PredicateKind::Or(_) => {
                Self::negation(Self::parenthesize(self.clone()))
            }
        };
        Ok(negated)
    }

    fn negation(inner: Predicate<T>) -> Self {
        let name = format!("{NOT_KEYWORD} {}", inner.name());
        let can_negate = inner.can_negate();
        Self::from_parts(name, PredicateKind::Not(inner), true, can_negate)
    }

    /// Wrap junctions in parentheses; every other kind is returned as is.
    fn parenthesize(inner: Predicate<T>) -> Self {
        if matches!(inner.kind(), PredicateKind::And(_) | PredicateKind::Or(_)) {
            let name = format!("({})", inner.name());
            let can_negate = inner.can_negate();
            Self::from_parts(name, PredicateKind::Parentheses(inner), true, can_negate)
        } else {
            inner
        }
    }

    /// Normalizing conjunction.
    pub fn and(&self, other: &Predicate<T>) -> Predicate<T> {
        Self::junction(Junction::And, [self.clone(), other.clone()])
    }

    /// Normalizing disjunction.
    pub fn or(&self, other: &Predicate<T>) -> Predicate<T> {
        Self::junction(Junction::Or, [self.clone(), other.clone()])
    }

    /// N-ary normalizing conjunction; `TRUE` for no operands.
    pub fn all(operands: impl IntoIterator<Item = Predicate<T>>) -> Predicate<T> {
        Self::junction(Junction::And, operands)
    }

    /// N-ary normalizing disjunction; `FALSE` for no operands.
    pub fn any(operands: impl IntoIterator<Item = Predicate<T>>) -> Predicate<T> {
        Self::junction(Junction::Or, operands)
    }

    /// Build a normalized junction over `operands`.
    pub fn junction(
        junction: Junction,
        operands: impl IntoIterator<Item = Predicate<T>>,
    ) -> Predicate<T> {
        let operands: SmallVec4<Predicate<T>> = operands.into_iter().collect();
        if operands.iter().any(|p| !p.is_defined()) {
            return Self::undefined();
        }

        let mut cores: Vec<Predicate<T>> = Vec::new();
        for operand in &operands {
            let core = operand.unparenthesized();
            match (junction, &core.node.kind) {
                (Junction::And, PredicateKind::False) => return Self::always_false(),
                (Junction::Or, PredicateKind::True) => return Self::always_true(),
                (Junction::And, PredicateKind::True) | (Junction::Or, PredicateKind::False) => {}
                (Junction::And, PredicateKind::And(inner))
                | (Junction::Or, PredicateKind::Or(inner)) => {
                    cores.extend(inner.iter().map(|p| p.unparenthesized().clone()));
                }
                _ => cores.push(core.clone()),
            }
        }

        let mut operands: Vec<Predicate<T>> = cores.into_iter().map(Self::parenthesize).collect();
        operands.sort();
        operands.dedup();

        match operands.len() {
            0 => {
                return match junction {
                    Junction::And => Self::always_true(),
                    Junction::Or => Self::always_false(),
                }
            }
            1 => return operands.swap_remove(0).unparenthesized().clone(),
            _ => {}
        }

        if Self::has_complementary_pair(&operands) {
            return Self::undefined();
        }

        let separator = format!(" {} ", junction.keyword());
        let name = operands
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(&separator);
        let can_negate = operands.iter().all(|p| p.can_negate());
        let kind = match junction {
            Junction::And => PredicateKind::And(operands),
            Junction::Or => PredicateKind::Or(operands),
        };
        Self::from_parts(name, kind, true, can_negate)
    }

    /// True when some operand is the negation of another (`p` and `NOT p`).
    fn has_complementary_pair(operands: &[Predicate<T>]) -> bool {
        let names: FxHashSet<&str> = operands.iter().map(|p| p.name()).collect();
        operands.iter().any(|p| match &p.node.kind {
            PredicateKind::Not(inner) => names.contains(inner.name()),
            _ => false,
        })
    }

    /// Direct operands of a junction (looking through parentheses); empty otherwise.
    pub fn operands(&self) -> &[Predicate<T>] {
        match &self.unparenthesized().node.kind {
            PredicateKind::And(ops) | PredicateKind::Or(ops) => ops,
            _ => &[],
        }
    }

    /// Distinct leaf predicates, ordered by name.
    pub fn atomics(&self) -> Vec<Predicate<T>> {
        let mut out = Vec::new();
        self.collect_atomics(&mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_atomics(&self, out: &mut Vec<Predicate<T>>) {
        match &self.node.kind {
            PredicateKind::Atomic(_) => out.push(self.clone()),
            PredicateKind::Not(inner) | PredicateKind::Parentheses(inner) => {
                inner.collect_atomics(out)
            }
            PredicateKind::And(ops) | PredicateKind::Or(ops) => {
                for op in ops {
                    op.collect_atomics(out);
                }
            }
            PredicateKind::True | PredicateKind::False | PredicateKind::Undefined => {}
        }
    }

    /// Number of distinct atomics.
    pub fn complexity(&self) -> usize {
        self.atomics().len()
    }

    /// Evaluate against a single item. Undefined predicates never hold.
    pub fn test(&self, item: &T) -> bool {
        match &self.node.kind {
            PredicateKind::True => true,
            PredicateKind::False | PredicateKind::Undefined => false,
            PredicateKind::Atomic(test) => test(item),
            PredicateKind::Not(inner) => !inner.test(item),
            PredicateKind::Parentheses(inner) => inner.test(item),
            PredicateKind::And(ops) => ops.iter().all(|p| p.test(item)),
            PredicateKind::Or(ops) => ops.iter().any(|p| p.test(item)),
        }
    }

    /// Evaluate with truth values supplied per atomic.
    ///
    /// Returns `None` when `assign` has no value for some atomic the
    /// evaluation reaches.
    pub fn evaluate_with<F>(&self, assign: &F) -> Option<bool>
    where
        F: Fn(&Predicate<T>) -> Option<bool>,
    {
        match &self.node.kind {
            PredicateKind::True => Some(true),
            PredicateKind::False | PredicateKind::Undefined => Some(false),
            PredicateKind::Atomic(_) => assign(self),
            PredicateKind::Not(inner) => inner.evaluate_with(assign).map(|v| !v),
            PredicateKind::Parentheses(inner) => inner.evaluate_with(assign),
            PredicateKind::And(ops) => {
                let mut result = true;
                for op in ops {
                    result &= op.evaluate_with(assign)?;
                }
                Some(result)
            }
            PredicateKind::Or(ops) => {
                let mut result = false;
                for op in ops {
                    result |= op.evaluate_with(assign)?;
                }
                Some(result)
            }
        }
    }

    /// True when `self` and `other` share at least one atomic.
    pub fn shares_atomics_with(&self, other: &Predicate<T>) -> bool {
        let ours: FxHashSet<String> =
            self.atomics().iter().map(|p| p.name().to_string()).collect();
        other.atomics().iter().any(|p| ours.contains(p.name()))
    }

    /// Operand list of a junction as a small vector, for rebuilding.
    pub(crate) fn operand_vec(&self) -> SmallVec4<Predicate<T>> {
        self.operands().iter().cloned().collect()
    }
}

impl<T> PartialEq for Predicate<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node) || self.node.name == other.node.name
    }
}

impl<T> Eq for Predicate<T> {}

impl<T> Hash for Predicate<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.name.hash(state);
    }
}

impl<T> PartialOrd for Predicate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Predicate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node.name.cmp(&other.node.name)
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.name())
    }
}
