//! Tracing subscriber setup for the CLI

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` the crate logs at `info`, or `debug` when `verbose`
/// is set. Calling this more than once leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "rfmseg=debug" } else { "rfmseg=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
