//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use xorpipe_core::XorError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Invalid user input (key escapes, config values)
    InvalidInput(String),

    /// Stream open, read or write failure
    Io(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::Io(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Classify a core error.
    pub fn from_core(err: XorError) -> Self {
        match err {
            XorError::Config(message) => CliError::InvalidInput(message),
            other => CliError::Io(other.to_string()),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Io(_) => exit_codes::IO_FAILED,
        }
    }
}

impl From<XorError> for CliError {
    fn from(err: XorError) -> Self {
        CliError::from_core(err)
    }
}

/// Exit code for an error returned from `run`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<XorError>() {
        return match core_err {
            XorError::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::IO_FAILED,
        };
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return exit_codes::IO_FAILED;
    }
    exit_codes::FAILURE
}
