use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Installs the global subscriber once. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        // A subscriber installed by someone else in the meantime wins.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
