//! rulebeam-core: shared errors, configuration, events, tracing, and
//! collection types for the rulebeam rule-mining engine.

pub mod config;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;
