//! Structured span field definitions for mining metrics.
//!
//! These constants define the field names used in tracing events across
//! the miner so log queries can key on them.

/// Canonical name of the target being mined.
pub const TARGET: &str = "rule_target";

/// Complexity level of the beam queue.
pub const LEVEL: &str = "level";

/// Candidates generated for a level.
pub const CANDIDATES: &str = "candidates";

/// Nodes admitted to a level's beam.
pub const ADMITTED: &str = "admitted";

/// Evaluation cache hit rate (0.0 - 1.0).
pub const CACHE_HIT_RATE: &str = "cache_hit_rate";

/// Mining duration of a target in milliseconds.
pub const TARGET_DURATION: &str = "target_duration_ms";
