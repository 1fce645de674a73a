//! Complexity-bounded beam: result nodes, ranking and per-level admission.

pub mod context;
pub mod node;
pub mod queue;

pub use context::BeamContext;
pub use node::{rank_cmp, Node};
pub use queue::{Admission, BeamQueue, QueueStats, Rejection};
