//! Diagnostic logging setup
//!
//! Progress output for users goes through [`Context`](crate::runner::Context);
//! this subscriber only carries internal `tracing` diagnostics to stderr.

use crate::runner::Verbosity;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `RMK_LOG=rmk=trace`
pub const LOG_ENV: &str = "RMK_LOG";

/// Filter used when `RMK_LOG` is unset
fn default_directive(verbosity: Verbosity) -> &'static str {
    if verbosity >= Verbosity::Verbose {
        "rmk=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
