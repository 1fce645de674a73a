//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "RULEBEAM_LOG";

/// Directives used when `RULEBEAM_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "rulebeam=info";

static INIT: Once = Once::new();

/// Install the global rulebeam subscriber.
///
/// Directives come from `RULEBEAM_LOG`, for example
/// `RULEBEAM_LOG=rulebeam_mining::beam=debug,rulebeam_mining::miner=info`.
/// Events carry the worker thread name so per-target work on the mining
/// pool (`rulebeam-N`) can be told apart. Only the first call has an effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // An embedding application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_names(true))
            .with(filter)
            .try_init();
    });
}
