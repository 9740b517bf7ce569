// Process-wide tracing subscriber for the server and trainer binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "predictd=info,trainer=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` wins over [`DEFAULT_FILTER`].
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
