//! Raw rule counts and the statistics derived from them.

use serde::Serialize;

use rulebeam_core::errors::RuleError;

/// Exponent applied to the intersection in `loe`.
const LOE_EXPONENT: f64 = 1.1;

/// The four raw counts of a rule `condition ⇒ target` over one database.
///
/// Only obtainable through [`RuleCounts::new`], so every instance is
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleCounts {
    database: usize,
    condition: usize,
    target: usize,
    intersection: usize,
}

impl RuleCounts {
    /// Validated counts. Fails when `intersection > min(condition, target)`,
    /// when either side exceeds the database size, or when the union of
    /// both sides does not fit in the database.
    pub fn new(
        database: usize,
        condition: usize,
        target: usize,
        intersection: usize,
    ) -> Result<Self, RuleError> {
        if intersection > condition.min(target)
            || condition > database
            || target > database
            || condition + target - intersection > database
        {
            return Err(RuleError::InvalidCounts {
                database,
                condition,
                target,
                intersection,
            });
        }
        Ok(Self {
            database,
            condition,
            target,
            intersection,
        })
    }

    pub fn database(&self) -> usize {
        self.database
    }

    pub fn condition(&self) -> usize {
        self.condition
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn intersection(&self) -> usize {
        self.intersection
    }

    /// Rows where the condition holds but the target does not.
    pub fn error_type1(&self) -> usize {
        self.condition - self.intersection
    }

    /// Rows where the target holds but the condition does not.
    pub fn error_type2(&self) -> usize {
        self.target - self.intersection
    }

    /// Rows where neither holds.
    pub fn neither(&self) -> usize {
        self.database + self.intersection - self.condition - self.target
    }

    pub fn support(&self) -> f64 {
        if self.database == 0 {
            return 0.0;
        }
        self.condition as f64 / self.database as f64
    }

    pub fn confidence(&self) -> f64 {
        if self.condition == 0 {
            return 0.0;
        }
        self.intersection as f64 / self.condition as f64
    }

    pub fn lift(&self) -> f64 {
        if self.condition == 0 || self.target == 0 {
            return 0.0;
        }
        (self.database as f64 * self.intersection as f64)
            / (self.condition as f64 * self.target as f64)
    }

    /// `(c/n) * (n - t) / (errorType1 + 1)`.
    pub fn conviction(&self) -> f64 {
        let uncovered = (self.database - self.target) as f64;
        self.support() * uncovered / (self.error_type1() as f64 + 1.0)
    }

    /// `(n * i^1.1 / (c + 1) - t) / (n - t + 1)`.
    pub fn loe(&self) -> f64 {
        let n = self.database as f64;
        let t = self.target as f64;
        let i = self.intersection as f64;
        let c = self.condition as f64;
        (n * i.powf(LOE_EXPONENT) / (c + 1.0) - t) / (n - t + 1.0)
    }

    /// Phi coefficient of the 2x2 contingency table.
    ///
    /// NaN when a margin is empty or full.
    pub fn correlation(&self) -> f64 {
        let n11 = self.intersection as f64;
        let n10 = self.error_type1() as f64;
        let n01 = self.error_type2() as f64;
        let n00 = self.neither() as f64;

        let c = self.condition as f64;
        let not_c = (self.database - self.condition) as f64;
        let t = self.target as f64;
        let not_t = (self.database - self.target) as f64;

        let denominator = (c * not_c * t * not_t).sqrt();
        if denominator == 0.0 {
            return f64::NAN;
        }
        ((n11 * n00 - n10 * n01) / denominator).clamp(-1.0, 1.0)
    }

    /// Snapshot of every derived statistic.
    pub fn statistics(&self) -> RuleStatistics {
        RuleStatistics {
            support: self.support(),
            confidence: self.confidence(),
            lift: self.lift(),
            conviction: self.conviction(),
            loe: self.loe(),
            correlation: self.correlation(),
        }
    }
}

/// Derived statistics of a rule. NaN values serialize as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleStatistics {
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub conviction: f64,
    pub loe: f64,
    pub correlation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_counts_rejected() {
        assert!(matches!(
            RuleCounts::new(10, 3, 2, 5),
            Err(RuleError::InvalidCounts { .. })
        ));
        assert!(RuleCounts::new(4, 5, 2, 1).is_err());
        assert!(RuleCounts::new(4, 2, 5, 1).is_err());
        assert!(RuleCounts::new(10, 6, 6, 1).is_err());
        assert!(RuleCounts::new(10, 3, 2, 2).is_ok());
    }

    #[test]
    fn test_accessors_and_serialized_fields() {
        let counts = RuleCounts::new(10, 3, 2, 2).unwrap();
        assert_eq!(
            (counts.database(), counts.condition(), counts.target(), counts.intersection()),
            (10, 3, 2, 2)
        );
        assert_eq!((counts.error_type1(), counts.error_type2(), counts.neither()), (1, 0, 7));

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["database"], 10);
        assert_eq!(json["intersection"], 2);
    }

    #[test]
    fn test_perfect_rule() {
        let counts = RuleCounts::new(100, 30, 30, 30).unwrap();
        assert!((counts.support() - 0.3).abs() < 1e-12);
        assert!((counts.confidence() - 1.0).abs() < 1e-12);
        assert!((counts.lift() - 100.0 / 30.0).abs() < 1e-9);
        assert!((counts.conviction() - 21.0).abs() < 1e-9);
        assert!((counts.correlation() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_conviction_with_errors() {
        // One false positive: (31/100) * 70 / 2.
        let counts = RuleCounts::new(100, 31, 30, 30).unwrap();
        assert!((counts.conviction() - 10.85).abs() < 1e-9);
    }

    #[test]
    fn test_loe() {
        let counts = RuleCounts::new(100, 30, 30, 30).unwrap();
        let expected = (100.0 * 30f64.powf(1.1) / 31.0 - 30.0) / 71.0;
        assert!((counts.loe() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_margins() {
        let empty = RuleCounts::new(10, 0, 4, 0).unwrap();
        assert_eq!(empty.confidence(), 0.0);
        assert_eq!(empty.lift(), 0.0);
        assert!(empty.correlation().is_nan());

        let full = RuleCounts::new(10, 10, 4, 4).unwrap();
        assert!(full.correlation().is_nan());

        let nothing = RuleCounts::new(0, 0, 0, 0).unwrap();
        assert_eq!(nothing.support(), 0.0);
        assert_eq!(nothing.conviction(), 0.0);
    }

    #[test]
    fn test_anti_correlated() {
        // Condition and target are disjoint halves.
        let counts = RuleCounts::new(10, 5, 5, 0).unwrap();
        assert!((counts.correlation() + 1.0).abs() < 1e-12);
    }
}
