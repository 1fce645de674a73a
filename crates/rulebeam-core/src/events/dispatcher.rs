//! EventDispatcher: synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::MiningEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn MiningEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn MiningEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler is logged and does not stop later handlers.
    fn emit<F: Fn(&dyn MiningEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("mining event handler panicked");
            }
        }
    }

    pub fn emit_mining_started(&self, event: &MiningStartedEvent) {
        self.emit(|h| h.on_mining_started(event));
    }

    pub fn emit_level_completed(&self, event: &LevelCompletedEvent) {
        self.emit(|h| h.on_level_completed(event));
    }

    pub fn emit_target_completed(&self, event: &TargetCompletedEvent) {
        self.emit(|h| h.on_target_completed(event));
    }

    pub fn emit_target_failed(&self, event: &TargetFailedEvent) {
        self.emit(|h| h.on_target_failed(event));
    }

    pub fn emit_mining_completed(&self, event: &MiningCompletedEvent) {
        self.emit(|h| h.on_mining_completed(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
