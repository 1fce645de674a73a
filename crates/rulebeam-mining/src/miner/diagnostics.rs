//! Per-target search diagnostics.

use std::fmt;

use serde::Serialize;

use crate::beam::{QueueStats, Rejection};

/// Counters of one complexity level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelDiagnostics {
    pub level: usize,
    /// Candidate conditions generated for the level.
    pub candidates: usize,
    /// Nodes left in the beam after the level.
    pub retained: usize,
    pub stats: QueueStats,
}

/// Summary of one target's search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiningDiagnostics {
    pub levels: Vec<LevelDiagnostics>,
    pub duration_ms: u64,
    pub cache_hit_rate: f64,
}

impl MiningDiagnostics {
    pub fn total_candidates(&self) -> usize {
        self.levels.iter().map(|l| l.candidates).sum()
    }

    pub fn total_offers(&self) -> usize {
        self.levels.iter().map(|l| l.stats.offers).sum()
    }

    pub fn total_admitted(&self) -> usize {
        self.levels.iter().map(|l| l.stats.admitted).sum()
    }

    pub fn rejected(&self, reason: Rejection) -> usize {
        self.levels.iter().map(|l| l.stats.rejected(reason)).sum()
    }
}

impl fmt::Display for MiningDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} candidates, {} offers, {} admitted in {} ms (cache hit rate {:.1}%)",
            self.total_candidates(),
            self.total_offers(),
            self.total_admitted(),
            self.duration_ms,
            self.cache_hit_rate * 100.0,
        )?;
        for level in &self.levels {
            write!(
                f,
                "  level {}: {} candidates, {} offers, {} admitted, {} retained",
                level.level, level.candidates, level.stats.offers, level.stats.admitted, level.retained,
            )?;
            for reason in Rejection::ALL {
                let count = level.stats.rejected(reason);
                if count > 0 {
                    write!(f, ", {} {}", count, reason.name())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
