//! MiningEventHandler trait with no-op defaults.

use super::types::*;

/// Trait for observing a mining run.
///
/// All methods have no-op default implementations, so handlers only need
/// to override the events they care about. Targets are mined on worker
/// threads, hence `Send + Sync`.
pub trait MiningEventHandler: Send + Sync {
    fn on_mining_started(&self, _event: &MiningStartedEvent) {}
    fn on_level_completed(&self, _event: &LevelCompletedEvent) {}
    fn on_target_completed(&self, _event: &TargetCompletedEvent) {}
    fn on_target_failed(&self, _event: &TargetFailedEvent) {}
    fn on_mining_completed(&self, _event: &MiningCompletedEvent) {}
}
