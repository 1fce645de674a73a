//! Data structures shared across rulebeam crates.

pub mod collections;

pub use collections::{FxHashMap, FxHashSet};
