//! Event payload types for mining lifecycle events.

/// Payload for `on_mining_started`.
#[derive(Debug, Clone)]
pub struct MiningStartedEvent {
    pub database_size: usize,
    pub predicate_count: usize,
    pub target_count: usize,
}

/// Payload for `on_level_completed`.
#[derive(Debug, Clone)]
pub struct LevelCompletedEvent {
    pub target: String,
    pub level: usize,
    pub candidates: usize,
    /// Offers accepted by the level's beam, replacements included.
    pub admitted: usize,
    /// Nodes left in the beam after the level.
    pub retained: usize,
}

/// Payload for `on_target_completed`.
#[derive(Debug, Clone)]
pub struct TargetCompletedEvent {
    pub target: String,
    pub node_count: usize,
    pub best_condition: Option<String>,
    pub duration_ms: u64,
}

/// Payload for `on_target_failed`.
#[derive(Debug, Clone)]
pub struct TargetFailedEvent {
    pub target: String,
    pub error_code: String,
    pub message: String,
}

/// Payload for `on_mining_completed`.
#[derive(Debug, Clone)]
pub struct MiningCompletedEvent {
    pub targets_succeeded: usize,
    pub targets_failed: usize,
    pub duration_ms: u64,
}
