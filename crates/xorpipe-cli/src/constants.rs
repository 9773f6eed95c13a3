//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success (including `--help` and `--version`)
/// - 1: General error (used for unclassified errors)
/// - 2: Usage error (reported by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Unclassified failure.
    pub const FAILURE: i32 = 1;

    /// Opening, reading or writing a stream failed.
    pub const IO_FAILED: i32 = 3;

    /// Invalid key, config file or option value.
    pub const INVALID_INPUT: i32 = 4;
}

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "XORPIPE_LOG";

/// Directory name under the XDG config home.
pub const CONFIG_DIR_NAME: &str = "xorpipe";
