//! Property-based tests for the predicate algebra, rule statistics and the
//! KL information model.

use proptest::prelude::*;

use rulebeam_mining::distribution::{
    kullback_leibler, Distribution, IndependentDistribution, TableDistribution,
};
use rulebeam_mining::{Database, EvaluationCache, Predicate, PredicateParser, Rule, RuleCounts};

const BITS: usize = 4;

fn bit(index: usize) -> Predicate<u8> {
    Predicate::atomic(format!("b{index}"), move |item: &u8| (*item >> index) & 1 == 1)
}

fn atoms() -> Vec<Predicate<u8>> {
    (0..BITS).map(bit).collect()
}

/// Fold a list of `(op, atom)` steps into a predicate over `b0..b3`.
fn build(steps: &[(u8, usize)]) -> Predicate<u8> {
    let atoms = atoms();
    let mut current = atoms[steps[0].1 % BITS].clone();
    for &(op, index) in &steps[1..] {
        let atom = &atoms[index % BITS];
        current = match op % 4 {
            0 => current.and(atom),
            1 => current.or(atom),
            2 => current.and(&atom.not().unwrap()),
            _ => current.not().unwrap_or(current),
        };
    }
    current
}

fn steps() -> impl Strategy<Value = Vec<(u8, usize)>> {
    prop::collection::vec((any::<u8>(), 0..BITS), 1..7)
}

fn assignment(item: u8) -> impl Fn(&Predicate<u8>) -> Option<bool> {
    move |p: &Predicate<u8>| Some(p.test(&item))
}

proptest! {
    #[test]
    fn prop_double_negation(steps in steps()) {
        let p = build(&steps);
        prop_assume!(p.is_defined());
        let twice = p.not().unwrap().not().unwrap();
        prop_assert_eq!(twice, p);
    }

    #[test]
    fn prop_junctions_commute(left in steps(), right in steps()) {
        let p = build(&left);
        let q = build(&right);
        prop_assert_eq!(p.and(&q), q.and(&p));
        prop_assert_eq!(p.or(&q), q.or(&p));
    }

    #[test]
    fn prop_identity_and_absorbing_elements(steps in steps()) {
        let p = build(&steps);
        prop_assume!(p.is_defined());
        prop_assert_eq!(p.and(&Predicate::always_true()), p.clone());
        prop_assert_eq!(p.or(&Predicate::always_false()), p.clone());
        prop_assert!(p.and(&Predicate::always_false()).is_false());
        prop_assert!(p.or(&Predicate::always_true()).is_true());
        prop_assert_eq!(p.and(&p), p.clone());
    }

    #[test]
    fn prop_evaluation_agrees_with_item_tests(
        steps in steps(),
        items in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let p = build(&steps);
        prop_assume!(p.is_defined());
        let db = Database::new(items);
        let cache = EvaluationCache::new();
        let rows = cache.evaluate(&p, &db);
        for (row, item) in db.iter().enumerate() {
            prop_assert_eq!(rows.contains(row as u32), p.test(item));
            prop_assert_eq!(p.evaluate_with(&assignment(*item)), Some(p.test(item)));
        }
    }

    #[test]
    fn prop_parse_round_trip(steps in steps()) {
        let p = build(&steps);
        prop_assume!(p.is_defined());
        let atoms = atoms();
        let parser = PredicateParser::new(&atoms);
        let parsed = parser.parse(p.name()).unwrap();
        prop_assert_eq!(parsed, p);
    }

    #[test]
    fn prop_statistics_in_range(
        both in 0usize..200,
        condition_only in 0usize..200,
        target_only in 0usize..200,
        neither in 0usize..200,
    ) {
        let database = both + condition_only + target_only + neither;
        prop_assume!(database > 0);
        let counts = RuleCounts::new(
            database,
            both + condition_only,
            both + target_only,
            both,
        ).unwrap();
        prop_assert_eq!(counts.neither(), neither);

        let stats = counts.statistics();
        prop_assert!((0.0..=1.0).contains(&stats.support));
        prop_assert!((0.0..=1.0).contains(&stats.confidence));
        prop_assert!(!(stats.lift < 0.0));
        prop_assert!(!(stats.conviction < 0.0));
        prop_assert!(stats.loe.is_finite());
        prop_assert!(stats.correlation.is_nan() || (-1.0..=1.0).contains(&stats.correlation));
    }

    #[test]
    fn prop_learning_never_increases_divergence(
        steps in steps(),
        items in prop::collection::vec(any::<u8>(), 1..150),
    ) {
        let condition = build(&steps);
        prop_assume!(condition.is_defined());
        let db = Database::new(items);
        let cache = EvaluationCache::new();
        let target = bit(BITS);
        let predicates: Vec<Predicate<u8>> = (0..=BITS).map(bit).collect();

        let empirical = TableDistribution::empirical(predicates.clone(), &db, &cache).unwrap();
        let independent = IndependentDistribution::new(predicates, &db, &cache).unwrap();
        let rule = Rule::evaluate(&condition, &target, &db, &cache).unwrap();
        let learned = independent.learn(&rule).unwrap();

        let total: f64 = (0..learned.len()).map(|e| learned.probability(e)).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);

        let before = kullback_leibler(&empirical, &independent).unwrap();
        let after = kullback_leibler(&empirical, &learned).unwrap();
        prop_assert!(before >= 0.0);
        prop_assert!(after >= 0.0);
        prop_assert!(after <= before + 1e-9, "KL grew from {} to {}", before, after);
    }
}
