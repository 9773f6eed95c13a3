//! Tracing setup.
//!
//! Logs go to stderr so they never mix with data written to stdout.

use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::LOG_ENV;

/// Initialize the global subscriber from `XORPIPE_LOG`, defaulting to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        debug!(error = %e, "tracing subscriber already installed");
    }
}
