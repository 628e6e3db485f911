//! Console diagnostics via `tracing`.
//!
//! User-facing report lines (outcome columns, the status table, diffs) are
//! printed by the commands; everything else goes through `tracing` and is
//! filtered here. `RUST_LOG` overrides the verbosity flag.

use tracing_subscriber::EnvFilter;

/// Install the global console subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let fallback = if verbose { "coffle=debug" } else { "coffle=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
