//! Diagnostic tracing for the solver.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The result JSON on
//! stdout and the files under `--attempt-log` are product output and never
//! depend on the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber. Defaults to `warn` when `RUST_LOG` is unset.
///
/// ```bash
/// RUST_LOG=solver=debug solver solve "What is 2 + 2?"
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
