//! Thread pool and cache configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the mining runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker threads. Default: available hardware parallelism.
    pub threads: Option<usize>,
    /// Maximum cached predicate evaluations per run. Default: 100_000.
    pub cache_capacity: Option<u64>,
    /// Number of top singleton rules used for co-occurrence statistics. Default: 10.
    pub upset_top: Option<usize>,
}

impl RuntimeConfig {
    /// Returns the effective worker count, never less than 1.
    pub fn effective_threads(&self) -> usize {
        self.threads.filter(|&t| t > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(100_000)
    }

    pub fn effective_upset_top(&self) -> usize {
        self.upset_top.unwrap_or(10)
    }
}
