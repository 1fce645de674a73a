//! rulebeam-mining: predicate algebra, rule statistics, the KL information
//! model, predicate injection and the complexity-bounded beam search.

pub mod beam;
pub mod database;
pub mod distribution;
pub mod miner;
pub mod predicate;
pub mod rule;

pub use beam::{BeamQueue, Node};
pub use database::{Database, DatabaseId};
pub use miner::{Miner, MiningReport, TargetResult};
pub use predicate::{EvaluationCache, Predicate, PredicateParser};
pub use rule::{Rule, RuleCounts};
